// SPDX-License-Identifier: GPL-3.0-or-later

//! Studio Ghibli API client.
//!
//! Fetches the full film list from the public REST endpoint. Requests can be
//! cancelled through a [`CancellationToken`]; there is no retry inside the client.

pub mod client;
pub mod error;
pub mod repository;

pub use client::{GetAllOptions, GhibliClient, GhibliClientBuilder};
pub use error::{ClientError, Result};
pub use repository::FilmRepository;
pub use tokio_util::sync::CancellationToken;

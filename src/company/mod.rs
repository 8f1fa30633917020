//! The "create company" command: its types, its handler, the behaviors that
//! enrich it, and the HTTP route that feeds it.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::pipeline::{BoxFuture, Command, CommandHandler, DispatchResult, Mediator, Pipeline, Trace};

mod behaviors;
mod routes;

pub use behaviors::{AddHash, AddKey, Hashed, Keyed, KEY_PREFIX};
pub use routes::{create_company, routes};

/// Input of `POST /companies`.
///
/// `key` and `hash` are filled in by [`AddKey`] and [`AddHash`]; whatever the
/// caller sends for them is overwritten.
///
/// Field names are lowercase; the PascalCase spellings are accepted too, since
/// existing clients send them. Other casings are unknown fields and ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateCompany {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Address")]
    pub address: String,
    #[serde(default, alias = "Key")]
    pub key: String,
    #[serde(default, alias = "Hash")]
    pub hash: String,
}

impl Command for CreateCompany {
    type Output = CompanyCreated;
}

/// The record produced for a new company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCreated {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub key: String,
    pub hash: String,
}

/// Manufactures the company record from the enriched command.
#[derive(Clone, Copy, Debug, Default)]
pub struct CreateCompanyHandler;

impl CommandHandler<CreateCompany> for CreateCompanyHandler {
    fn handle<'a>(
        &'a self,
        cmd: CreateCompany,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, DispatchResult<CreateCompany>> {
        Box::pin(async move {
            info!("Creating new company");
            Ok(CompanyCreated {
                id: Uuid::new_v4(),
                name: cmd.name,
                address: cmd.address,
                key: cmd.key,
                hash: cmd.hash,
            })
        })
    }
}

/// The production pipeline: tracing, then key, then hash, then the handler.
pub fn pipeline() -> Pipeline<CreateCompany> {
    Pipeline::new(CreateCompanyHandler)
        .behavior(Trace)
        .behavior(AddKey)
        .behavior(AddHash)
}

/// A mediator with every command this service handles.
pub fn mediator() -> Mediator {
    Mediator::builder().register(pipeline()).build()
}

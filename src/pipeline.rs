// src/pipeline.rs
use crate::document::fields_match;
use crate::error::Result;
use crate::mongo::{ConnectOptions, Connection, InsertAck};

use bson::Document;
use tracing::{info, warn};

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connect: ConnectOptions,
    pub database: String,
    pub collection: String,
    pub document: Document,
    pub filter: Document,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub inserted: InsertAck,
    pub documents: Vec<Document>,
    /// Whether the last document returned carries the inserted fields.
    pub round_trip_ok: bool,
}

/// Connect, insert, find, disconnect. Each step is awaited before the next.
///
/// The connection is closed even when the insert or the find fails; the
/// step's error is the one returned.
pub async fn run(settings: &Settings) -> Result<Report> {
    info!(uri = %settings.connect.redacted_uri(), "connecting");
    let connection = Connection::open(&settings.connect).await?;
    info!("connected");

    let outcome = exchange(&connection, settings).await;

    info!("disconnecting");
    let closed = connection.close().await;
    settle(outcome, closed)
}

/// Picks the result of a run once the connection has been closed. A failed
/// step wins over a failed close.
fn settle(outcome: Result<Report>, closed: Result<()>) -> Result<Report> {
    match (outcome, closed) {
        (Ok(report), Ok(())) => {
            info!("disconnected");
            Ok(report)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => {
            info!("disconnected");
            Err(e)
        }
        (Err(e), Err(close_err)) => {
            warn!(error = %close_err, "disconnect after failed step also failed");
            Err(e)
        }
    }
}

async fn exchange(connection: &Connection, settings: &Settings) -> Result<Report> {
    info!(database = %settings.database, "selecting database");
    let database = connection.database(&settings.database);
    info!(collection = %settings.collection, "selecting collection");
    let collection = database.collection(&settings.collection);

    info!(namespace = %collection.namespace(), "writing document");
    let inserted = collection.insert(settings.document.clone()).await?;

    info!(filter = %settings.filter, "finding documents");
    let documents = collection.find(settings.filter.clone()).await?;
    info!(count = documents.len(), "documents found");

    let round_trip_ok = last_matches(&settings.document, &documents);
    if !round_trip_ok {
        warn!("last document found does not match the inserted one");
    }

    Ok(Report {
        inserted,
        documents,
        round_trip_ok,
    })
}

/// True when the final document returned carries the inserted fields.
fn last_matches(inserted: &Document, documents: &[Document]) -> bool {
    documents
        .last()
        .is_some_and(|last| fields_match(inserted, last))
}

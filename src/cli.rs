// src/cli.rs
use crate::document::{load_document, parse_filter, Article};
use crate::error::Result;
use crate::mongo::{ConnectOptions, Credentials};
use crate::pipeline::Settings;

use clap::Parser;
use std::time::Duration;

/// Insert one document into a MongoDB collection, read the collection back and disconnect
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// MongoDB connection string
    #[arg(long, default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    /// Username to authenticate with; no authentication when omitted
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Authentication database
    #[arg(long, requires = "username")]
    pub auth_source: Option<String>,

    #[arg(long, default_value = "efc")]
    pub db: String,

    #[arg(long, default_value = "articles")]
    pub collection: String,

    /// YAML or JSON file holding the document to insert (defaults to the sample article)
    #[arg(long)]
    pub document: Option<String>,

    /// JSON filter for the read back
    #[arg(long, default_value = "{}")]
    pub filter: String,

    #[arg(long)]
    pub server_selection_timeout_ms: Option<u64>,

    #[arg(long, default_value_t = 10_000)]
    pub shutdown_timeout_ms: u64,

    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn into_settings(self) -> Result<Settings> {
        let document = match &self.document {
            Some(path) => load_document(path)?,
            None => Article::sample().to_document()?,
        };
        let filter = parse_filter(&self.filter)?;

        let credentials = self.username.zip(self.password).map(|(username, password)| Credentials {
            username,
            password,
            source: self.auth_source,
        });

        let mut connect = ConnectOptions::new(self.mongo_uri);
        connect.credentials = credentials;
        connect.server_selection_timeout = self.server_selection_timeout_ms.map(Duration::from_millis);
        connect.shutdown_timeout = Duration::from_millis(self.shutdown_timeout_ms);

        Ok(Settings {
            connect,
            database: self.db,
            collection: self.collection,
            document,
            filter,
        })
    }
}

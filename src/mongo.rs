// src/mongo.rs
use crate::error::{Result, RoundtripError};

use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, Credential};
use mongodb::{Client, Collection, Database};
use std::future::IntoFuture;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Authentication database; the driver falls back to `admin` when unset.
    pub source: Option<String>,
}

impl Credentials {
    pub fn to_credential(&self) -> Credential {
        let mut credential = Credential::default();
        credential.username = Some(self.username.clone());
        credential.password = Some(self.password.clone());
        credential.source = self.source.clone();
        credential
    }
}

#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub uri: String,
    pub credentials: Option<Credentials>,
    pub app_name: Option<String>,
    pub server_selection_timeout: Option<Duration>,
    pub shutdown_timeout: Duration,
}

impl ConnectOptions {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            credentials: None,
            app_name: Some(env!("CARGO_PKG_NAME").to_string()),
            server_selection_timeout: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// The connection string with any `user:password@` part masked, for logging.
    pub fn redacted_uri(&self) -> String {
        let (scheme, rest) = match self.uri.split_once("://") {
            Some((scheme, rest)) => (format!("{}://", scheme), rest),
            None => (String::new(), self.uri.as_str()),
        };
        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        match rest[..authority_end].rfind('@') {
            Some(at) => format!("{}***@{}", scheme, &rest[at + 1..]),
            None => self.uri.clone(),
        }
    }
}

/// An open session to a deployment.
///
/// Database and collection handles borrow the connection, and [`Connection::close`]
/// consumes it, so nothing selected from a connection outlives it.
pub struct Connection {
    client: Client,
    shutdown_timeout: Duration,
}

impl Connection {
    /// Connects and confirms the deployment answers a `ping`.
    ///
    /// Malformed URIs, unreachable hosts and rejected credentials all come
    /// back as [`RoundtripError::Connection`]. Nothing is retried.
    pub async fn open(options: &ConnectOptions) -> Result<Self> {
        let connection = Self::build(options).await?;
        connection
            .client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(RoundtripError::Connection)?;
        Ok(connection)
    }

    /// Builds the client without any network round trip. The driver connects lazily.
    pub(crate) async fn build(options: &ConnectOptions) -> Result<Self> {
        let mut client_options = ClientOptions::parse(&options.uri)
            .await
            .map_err(RoundtripError::Connection)?;
        if let Some(credentials) = &options.credentials {
            client_options.credential = Some(credentials.to_credential());
        }
        if options.app_name.is_some() {
            client_options.app_name = options.app_name.clone();
        }
        if options.server_selection_timeout.is_some() {
            client_options.server_selection_timeout = options.server_selection_timeout;
        }
        let client = Client::with_options(client_options).map_err(RoundtripError::Connection)?;

        Ok(Self {
            client,
            shutdown_timeout: options.shutdown_timeout,
        })
    }

    pub fn database(&self, name: &str) -> DatabaseRef<'_> {
        DatabaseRef {
            inner: self.client.database(name),
            _connection: PhantomData,
        }
    }

    pub async fn close(self) -> Result<()> {
        let timeout = self.shutdown_timeout;
        tokio::time::timeout(timeout, self.client.shutdown().into_future())
            .await
            .map_err(|source| RoundtripError::Disconnect { timeout, source })
    }
}

pub struct DatabaseRef<'c> {
    inner: Database,
    _connection: PhantomData<&'c Connection>,
}

impl<'c> DatabaseRef<'c> {
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn collection(&self, name: &str) -> CollectionRef<'c> {
        CollectionRef {
            inner: self.inner.collection::<Document>(name),
            _connection: PhantomData,
        }
    }
}

pub struct CollectionRef<'c> {
    inner: Collection<Document>,
    _connection: PhantomData<&'c Connection>,
}

/// Acknowledgement of a single insert.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertAck {
    pub inserted_id: Bson,
    pub inserted_count: u64,
}

impl<'c> CollectionRef<'c> {
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn namespace(&self) -> String {
        self.inner.namespace().to_string()
    }

    pub async fn insert(&self, document: Document) -> Result<InsertAck> {
        let result = self
            .inner
            .insert_one(document)
            .await
            .map_err(RoundtripError::Write)?;
        debug!(id = %result.inserted_id, "document inserted");
        Ok(InsertAck {
            inserted_id: result.inserted_id,
            inserted_count: 1,
        })
    }

    /// Runs `filter` and collects every match. An empty filter returns the whole collection.
    pub async fn find(&self, filter: Document) -> Result<Vec<Document>> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(RoundtripError::Read)?;
        cursor.try_collect().await.map_err(RoundtripError::Read)
    }
}

//! DCC Client Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Client for submitting metadata records to the ENCODE Portal.
//!
//! # Overview
//!
//! - **Lookup**: find a record by any of its identifiers ([`Connection::get`])
//! - **Submission**: create or update a record from a payload ([`Connection::send`])
//! - **Hooks**: attachment, alias and md5sum handling before submission, cloud
//!   upload of file contents after it ([`hooks`])
//! - **Upload**: copy a file record's content to cloud storage ([`upload`])
//! - **CLI**: the `dcc` binary ([`Cli`])
//!
//! # Example
//!
//! ```no_run
//! use dcc_client::{Config, Connection, Payload, SendOptions};
//! use serde_json::json;
//!
//! # async fn example() -> dcc_client::Result<()> {
//! let conn = Connection::connect(Config::from_env()?).await?;
//! let payload = Payload::from_value(json!({
//!     "_profile": "biosample",
//!     "aliases": ["rep1-biosample"],
//!     "biosample_ontology": "/biosample-types/cell_line_EFO_0002067/",
//!     "organism": "human"
//! }))?;
//! let record = conn.send(payload, SendOptions::default()).await?;
//! println!("{}", record["accession"]);
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod api;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod hooks;
pub mod payload;
pub mod profiles;
pub mod upload;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use connection::{Connection, PatchOptions, SendOptions, UploadOutcome};
pub use error::{ClientError, Result};
pub use payload::Payload;
pub use profiles::ProfileRegistry;

use clap::{Parser, Subcommand, ValueEnum};
use dcc_common::DccMode;
use std::path::PathBuf;

/// dcc - submit and retrieve ENCODE Portal records
#[derive(Parser, Debug)]
#[command(name = "dcc")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Portal deployment (dev or prod); overrides DCC_MODE
    #[arg(short, long, global = true)]
    pub mode: Option<DccMode>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a record, trying each identifier in turn
    Get {
        /// Record identifiers (accession, UUID, alias, @id, md5sum)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Response frame (e.g. object, embedded)
        #[arg(short, long)]
        frame: Option<String>,

        /// Print nothing instead of failing when no identifier is found
        #[arg(long)]
        ignore_404: bool,
    },

    /// Search the Portal
    Search {
        /// Query parameter as KEY=VALUE (repeatable)
        #[arg(short, long = "term", value_name = "KEY=VALUE", required = true)]
        terms: Vec<String>,

        /// Maximum number of results (all when unset)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Submit payloads from a JSON file (one object or an array of objects)
    Send {
        /// Input JSON file
        #[arg(short, long)]
        infile: PathBuf,

        /// Profile for payloads that don't set '_profile'
        #[arg(short, long)]
        profile: Option<String>,

        /// Submission method
        #[arg(long, value_enum, default_value_t = SubmitMethod::Send)]
        method: SubmitMethod,

        /// Fail instead of creating records that don't exist
        #[arg(long)]
        error_if_not_found: bool,

        /// Replace list values on the Portal instead of extending them
        #[arg(long)]
        replace_arrays: bool,

        /// Return the current record when an update is forbidden
        #[arg(long)]
        ignore_403: bool,
    },

    /// Upload the content of a file record
    Upload {
        /// File record identifier
        #[arg(short, long)]
        file_id: String,

        /// Local file (defaults to the record's submitted_file_name)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Upload mechanism
        #[arg(long, value_enum, default_value_t = UploadBackend::Cli)]
        backend: UploadBackend,

        /// S3 region for the sdk backend
        #[arg(long, default_value = upload::DEFAULT_UPLOAD_REGION)]
        region: String,
    },

    /// Post or link documents
    Document {
        #[command(subcommand)]
        command: DocumentCommand,
    },

    /// Print the aliases of a record
    Aliases {
        /// Record identifier
        #[arg(short, long)]
        record: String,

        /// Drop the lab prefix
        #[arg(short, long)]
        strip_prefix: bool,
    },

    /// Append replicate numbers to a file of replicate identifiers
    ReplicateNumbers {
        /// Input file; replicate identifiers in column one
        #[arg(short, long)]
        infile: PathBuf,

        /// Output file
        #[arg(short, long)]
        outfile: PathBuf,
    },

    /// List the FASTQ files of an experiment by replicate
    FastqReplicates {
        /// Experiment identifier
        #[arg(short, long)]
        experiment: String,

        /// Only this biological replicate
        #[arg(short, long)]
        bio_rep: Option<u64>,

        /// Only this technical replicate
        #[arg(short, long)]
        tech_rep: Option<u64>,
    },

    /// List the known profile IDs
    Profiles,
}

/// Document subcommands
#[derive(Subcommand, Debug)]
pub enum DocumentCommand {
    /// Create a document record from a local file
    Post {
        /// Local document file
        #[arg(short, long)]
        document: PathBuf,

        /// Document type (e.g. "data QA")
        #[arg(short = 't', long)]
        document_type: String,

        /// Description of the document
        #[arg(short = 'D', long)]
        description: String,

        /// File name offered on download (defaults to the local file name)
        #[arg(long)]
        download_filename: Option<String>,
    },

    /// Link an existing document to a record
    Link {
        /// Record to link the document to
        #[arg(short, long)]
        record: String,

        /// Document identifier
        #[arg(short, long)]
        document: String,
    },
}

/// How `send` submits each payload
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMethod {
    /// Create or update, depending on whether the record exists
    Send,
    /// Always create
    Post,
    /// Always update
    Patch,
}

/// Upload mechanism
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadBackend {
    /// The `aws` command line tool
    Cli,
    /// The built-in S3 client
    Sdk,
}

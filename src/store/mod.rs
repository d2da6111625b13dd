//! The transaction store.
//!
//! Owns the list of captured transactions (newest first) and the active
//! selection. Records enter the store unprocessed; the decoder and formatter
//! run on a record exactly once, the first time it is activated.

pub mod error;
pub mod events;

pub use error::StoreError;
pub use events::{EventOutcome, Inspector, InspectorEvent};

use crate::decoder::decode_message;
use crate::formatter::{classify_and_format, format_duration, FormatOptions, StatusClass};
use crate::models::{InitialPayload, TransactionRecord};
use crate::replay::ReplayRequest;
use log::{debug, info, warn};
use serde_json::Value;

/// Runs the decoder and formatter over a copy of a record.
///
/// The input is never modified, so a failure leaves no partial output
/// behind. Already processed records are returned unchanged.
///
/// # Arguments
///
/// * `txn` - The record to process
/// * `options` - Formatting settings
///
/// # Returns
///
/// The processed record, or a `StoreError` naming the record if a base64
/// field is malformed.
pub fn process_transaction(
    txn: &TransactionRecord,
    options: &FormatOptions,
) -> Result<TransactionRecord, StoreError> {
    let mut out = txn.clone();
    if out.processed {
        return Ok(out);
    }

    let decode_err = |source| StoreError::Decode {
        id: txn.id.clone(),
        source,
    };
    decode_message(&mut out.request).map_err(decode_err)?;
    decode_message(&mut out.response).map_err(decode_err)?;

    let format_err = |source| StoreError::Format {
        id: txn.id.clone(),
        source,
    };
    classify_and_format(&mut out.request.body, options).map_err(format_err)?;
    classify_and_format(&mut out.response.body, options).map_err(format_err)?;

    out.response.status_class = out
        .response
        .status_code
        .as_deref()
        .and_then(StatusClass::for_status);
    out.processed = true;

    Ok(out)
}

/// Ordered, single-owner collection of transactions with one active record.
#[derive(Debug, Default)]
pub struct TransactionStore {
    /// Newest first.
    txns: Vec<TransactionRecord>,
    active: Option<String>,
    tunnels: Vec<Value>,
    options: FormatOptions,
}

impl TransactionStore {
    /// Creates an empty store that formats bodies with `options`.
    pub fn new(options: FormatOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Replaces the store's contents with an initial batch.
    ///
    /// The batch order is kept as given. Every record gets its formatted
    /// duration; the first record, if any, is processed and activated.
    ///
    /// # Returns
    ///
    /// `Ok(())`, or the processing error of the first record. The batch is
    /// loaded and the first record is active either way.
    pub fn initialize(&mut self, records: Vec<TransactionRecord>) -> Result<(), StoreError> {
        self.txns = records;
        self.active = None;
        for txn in &mut self.txns {
            txn.formatted_duration = Some(format_duration(txn.duration_nanos));
        }
        info!("Loaded {} transactions", self.txns.len());

        match self.txns.first().map(|txn| txn.id.clone()) {
            Some(id) => self.activate(&id),
            None => Ok(()),
        }
    }

    /// Parses an initial batch and loads it with [`TransactionStore::initialize`].
    ///
    /// Accepts a bare JSON array of records or the backend's page payload
    /// `{"Txns": [...], "UiState": {"Tunnels": [...]}}`. A malformed batch
    /// leaves the store untouched.
    pub fn initialize_from_json(&mut self, json: &str) -> Result<(), StoreError> {
        let payload = InitialPayload::from_json(json)?;
        self.tunnels = payload.ui_state.tunnels;
        self.initialize(payload.txns)
    }

    /// Adds one streamed record at the head of the list.
    ///
    /// The record is not processed unless nothing is active yet, in which
    /// case it becomes the active record. A record that failed processing
    /// still counts as active, so records streamed after it wait to be
    /// selected.
    ///
    /// # Arguments
    ///
    /// * `serialized` - One record as JSON text
    ///
    /// # Returns
    ///
    /// The id of the inserted record. Malformed JSON, a missing field or a
    /// duplicate id is rejected without touching the store. If the record
    /// was activated but could not be processed, the processing error is
    /// returned; the record stays in the store and active.
    pub fn add_streamed(&mut self, serialized: &str) -> Result<String, StoreError> {
        let mut txn = TransactionRecord::from_json(serialized)?;
        if self.get(&txn.id).is_some() {
            warn!("Rejecting duplicate transaction {}", txn.id);
            return Err(StoreError::DuplicateTransaction(txn.id));
        }

        txn.formatted_duration = Some(format_duration(txn.duration_nanos));
        let id = txn.id.clone();
        self.txns.insert(0, txn);
        info!("Inserted transaction {}", id);

        if self.active.is_none() {
            self.activate(&id)?;
        }
        Ok(id)
    }

    /// Makes a record active, processing it first if needed.
    ///
    /// Processing happens at most once per record. Activating an already
    /// processed record only moves the active pointer.
    ///
    /// # Returns
    ///
    /// `Ok(())`, `Err(StoreError::UnknownTransaction)` when no record has
    /// this id, or the processing error. On a processing error the record
    /// stays unprocessed but still becomes active.
    pub fn activate(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::UnknownTransaction(id.to_string()))?;
        self.active = Some(id.to_string());

        let txn = &self.txns[index];
        if txn.processed {
            debug!("Transaction {} already processed", id);
            return Ok(());
        }

        match process_transaction(txn, &self.options) {
            Ok(processed) => {
                self.txns[index] = processed;
                info!("Activated transaction {}", id);
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    /// Returns the active record.
    pub fn get_active(&self) -> Option<&TransactionRecord> {
        let id = self.active.as_deref()?;
        self.get(id)
    }

    /// Checks whether `txn` is the active record, comparing by id.
    pub fn is_active(&self, txn: &TransactionRecord) -> bool {
        self.active.as_deref() == Some(txn.id.as_str())
    }

    /// All records, newest first.
    pub fn all(&self) -> &[TransactionRecord] {
        &self.txns
    }

    pub fn get(&self, id: &str) -> Option<&TransactionRecord> {
        self.txns.iter().find(|txn| txn.id == id)
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    /// Tunnels passed along with the initial batch.
    pub fn tunnels(&self) -> &[Value] {
        &self.tunnels
    }

    /// Builds the replay command for the active record.
    pub fn replay_request(&self) -> Option<ReplayRequest> {
        self.get_active().map(|txn| ReplayRequest::new(txn.id.clone()))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.txns.iter().position(|txn| txn.id == id)
    }
}

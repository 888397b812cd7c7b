//! Worker message protocol
//!
//! Every request carries a oneshot reply channel; the worker answers each
//! request exactly once.

use std::fmt;

use tokio::sync::oneshot;

use super::entry::EncryptedEntry;
use crate::traits::EngineVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Init,
    Decrypt,
    Destroy,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Init => write!(f, "INIT"),
            MessageKind::Decrypt => write!(f, "DECRYPT"),
            MessageKind::Destroy => write!(f, "DESTROY"),
        }
    }
}

pub type Reply = oneshot::Sender<WorkerResponse>;

/// Request sent to a decrypt worker
#[derive(Debug)]
pub enum WorkerRequest {
    /// Derive decryption state from the user key
    Init {
        user_key: Vec<u8>,
        variant: EngineVariant,
        reply: Reply,
    },

    /// Decrypt a shard, skipping entries that fail
    Decrypt {
        entries: Vec<EncryptedEntry>,
        reply: Reply,
    },

    /// Release decryption state; the worker accepts nothing afterwards
    Destroy { reply: Reply },
}

impl WorkerRequest {
    pub fn kind(&self) -> MessageKind {
        match self {
            WorkerRequest::Init { .. } => MessageKind::Init,
            WorkerRequest::Decrypt { .. } => MessageKind::Decrypt,
            WorkerRequest::Destroy { .. } => MessageKind::Destroy,
        }
    }
}

/// Worker answer to a [`WorkerRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerResponse {
    Init,
    Decrypt(Vec<Vec<u8>>),
    Destroy,
    /// The request named by `kind` was refused or failed
    Error { kind: MessageKind, message: String },
}

impl WorkerResponse {
    pub fn error(kind: MessageKind, message: impl Into<String>) -> Self {
        WorkerResponse::Error {
            kind,
            message: message.into(),
        }
    }

    /// Kind of request this response answers
    pub fn kind(&self) -> MessageKind {
        match self {
            WorkerResponse::Init => MessageKind::Init,
            WorkerResponse::Decrypt(_) => MessageKind::Decrypt,
            WorkerResponse::Destroy => MessageKind::Destroy,
            WorkerResponse::Error { kind, .. } => *kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(MessageKind::Init.to_string(), "INIT");
        assert_eq!(MessageKind::Decrypt.to_string(), "DECRYPT");
        assert_eq!(MessageKind::Destroy.to_string(), "DESTROY");
    }

    #[test]
    fn test_request_kind() {
        let (reply, _rx) = oneshot::channel();
        let request = WorkerRequest::Decrypt {
            entries: vec![],
            reply,
        };
        assert_eq!(request.kind(), MessageKind::Decrypt);
    }

    #[test]
    fn test_error_response_answers_its_kind() {
        let response = WorkerResponse::error(MessageKind::Init, "bad key");
        assert_eq!(response.kind(), MessageKind::Init);
        assert_eq!(WorkerResponse::Decrypt(vec![]).kind(), MessageKind::Decrypt);
    }
}

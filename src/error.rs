use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Heap,
    Tokenize,
    Format,
    Unpack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Setup,
    Decode,
    Unpack,
}

#[derive(Debug, Clone, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub stage: ErrorStage,
    pub message: String,
}

impl Error {
    pub fn heap(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Heap,
            stage: ErrorStage::Setup,
            message: message.into(),
        }
    }

    pub fn tokenize(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Tokenize,
            stage: ErrorStage::Decode,
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Format,
            stage: ErrorStage::Unpack,
            message: message.into(),
        }
    }

    pub fn unpack(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unpack,
            stage: ErrorStage::Unpack,
            message: message.into(),
        }
    }
}

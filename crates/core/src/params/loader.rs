//! Configuration text loader
//!
//! Turns the XML `parameters` document into a [`ParameterTree`]. Input is
//! capped at [`MAX_PARAMS_SIZE`] bytes and checked before any parsing.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

use super::node::{ParameterNode, ParameterTree, ROOT_NAME};

/// Maximum accepted configuration size in bytes
pub const MAX_PARAMS_SIZE: usize = 8192;

/// Errors raised while parsing configuration text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input exceeds the size cap
    #[error("parameters too large: {size} bytes exceeds maximum of {max} bytes")]
    TooLarge {
        /// Actual input size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Input is empty or whitespace only
    #[error("parameters text is empty")]
    Empty,

    /// No root element was found
    #[error("parameters text has no root element")]
    MissingRoot,

    /// Root element has the wrong name
    #[error("expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        /// Required root name
        expected: &'static str,
        /// Name actually found
        found: String,
    },

    /// Closing tag does not match the open element
    #[error("mismatched closing tag at byte {position}: expected </{expected}>, found </{found}>")]
    MismatchedEnd {
        /// Element that was open
        expected: String,
        /// Closing tag encountered
        found: String,
        /// Byte offset
        position: u64,
    },

    /// Closing tag with no open element
    #[error("unexpected closing tag </{found}> at byte {position}")]
    UnexpectedEnd {
        /// Closing tag encountered
        found: String,
        /// Byte offset
        position: u64,
    },

    /// Input ended while an element was still open
    #[error("unterminated element <{element}>")]
    Unterminated {
        /// Innermost open element
        element: String,
    },

    /// Content after the root element closed, or text outside it
    #[error("unexpected content outside the root element at byte {position}")]
    TrailingContent {
        /// Byte offset
        position: u64,
    },

    /// Lower-level markup error
    #[error("malformed parameters at byte {position}: {message}")]
    Malformed {
        /// Byte offset
        position: u64,
        /// Parser message
        message: String,
    },
}

/// Parse configuration text into a tree
///
/// Fails on oversized, empty, or malformed input; the caller's previous
/// state is never touched because a fresh tree is returned.
pub fn parse_parameters(text: &str) -> Result<ParameterTree, ParseError> {
    if text.len() > MAX_PARAMS_SIZE {
        return Err(ParseError::TooLarge {
            size: text.len(),
            max: MAX_PARAMS_SIZE,
        });
    }
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = false;

    let mut stack: Vec<ParameterNode> = Vec::new();
    let mut root: Option<ParameterNode> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| ParseError::Malformed {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                let name = element_name(start.name().as_ref(), position)?;
                open_element(&stack, &root, &name, position)?;
                stack.push(ParameterNode::new(name));
            }
            Event::Empty(start) => {
                let name = element_name(start.name().as_ref(), position)?;
                open_element(&stack, &root, &name, position)?;
                close_element(&mut stack, &mut root, ParameterNode::new(name));
            }
            Event::End(end) => {
                let name = element_name(end.name().as_ref(), position)?;
                let node = stack.pop().ok_or_else(|| ParseError::UnexpectedEnd {
                    found: name.clone(),
                    position,
                })?;
                if node.name() != name {
                    return Err(ParseError::MismatchedEnd {
                        expected: node.name().to_string(),
                        found: name,
                        position,
                    });
                }
                close_element(&mut stack, &mut root, node);
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| ParseError::Malformed {
                    position,
                    message: e.to_string(),
                })?;
                push_text(&mut stack, value.trim(), position)?;
            }
            Event::CData(data) => {
                let value = std::str::from_utf8(&data).map_err(|e| ParseError::Malformed {
                    position,
                    message: e.to_string(),
                })?;
                push_text(&mut stack, value.trim(), position)?;
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unterminated {
            element: open.name().to_string(),
        });
    }

    let root = root.ok_or(ParseError::MissingRoot)?;
    debug!(target: "docket::params", values = root.value_count(), "Parsed parameters");
    Ok(ParameterTree::from_root(root))
}

fn element_name(raw: &[u8], position: u64) -> Result<String, ParseError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| ParseError::Malformed {
            position,
            message: e.to_string(),
        })
}

fn open_element(
    stack: &[ParameterNode],
    root: &Option<ParameterNode>,
    name: &str,
    position: u64,
) -> Result<(), ParseError> {
    if !stack.is_empty() {
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::TrailingContent { position });
    }
    if name != ROOT_NAME {
        return Err(ParseError::UnexpectedRoot {
            expected: ROOT_NAME,
            found: name.to_string(),
        });
    }
    Ok(())
}

fn close_element(
    stack: &mut [ParameterNode],
    root: &mut Option<ParameterNode>,
    node: ParameterNode,
) {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_child(node);
        }
        None => *root = Some(node),
    }
}

fn push_text(stack: &mut [ParameterNode], value: &str, position: u64) -> Result<(), ParseError> {
    if value.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(node) => {
            node.push_value(value);
            Ok(())
        }
        None => Err(ParseError::TrailingContent { position }),
    }
}

//! Header storage and normalization glue.
//!
//! The header collection itself is `http::HeaderMap<String>`, which provides
//! case-insensitive names and multiple values per name. What this module adds
//! is *deferred* normalization: a [`Message`] accepts headers either as an
//! already-built collection or as plain name/value pairs, and stores whichever
//! form it was given verbatim. The pairs are only folded into a `HeaderMap`
//! the first time the collection is actually read.
//!
//! The storage field is a tagged union rather than a runtime type check:
//! either the raw form has not been materialized yet, or the collection is
//! ready and later reads skip normalization entirely.
//!
//! [`Message`]: crate::message::Message

use http::HeaderMap;
use http::header::HeaderName;

use crate::error::MessageError;

/// The value side of a raw header pair: a single value or a sequence of
/// values for the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

impl HeaderValues {
    /// Iterates the values in order, regardless of arity.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        match self {
            HeaderValues::One(value) => std::slice::from_ref(value).iter(),
            HeaderValues::Many(values) => values.iter(),
        }
    }
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        HeaderValues::One(value.to_owned())
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        HeaderValues::One(value)
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        HeaderValues::Many(values)
    }
}

impl From<Vec<&str>> for HeaderValues {
    fn from(values: Vec<&str>) -> Self {
        HeaderValues::Many(values.into_iter().map(str::to_owned).collect())
    }
}

/// An un-normalized header input, stored verbatim until first read.
#[derive(Debug, Clone)]
pub enum HeaderSource {
    /// Plain name/value pairs, not yet validated or folded into a collection.
    Pairs(Vec<(String, HeaderValues)>),
    /// An already-built collection, adopted as-is.
    Collection(HeaderMap<String>),
}

impl HeaderSource {
    /// Folds this source into a fresh collection.
    ///
    /// An invalid name discards the partially built collection and fails the
    /// whole call, so no entry of a bad batch leaks out.
    fn build_map(&self) -> Result<HeaderMap<String>, MessageError> {
        match self {
            HeaderSource::Collection(map) => Ok(map.clone()),
            HeaderSource::Pairs(pairs) => {
                let mut map = HeaderMap::with_capacity(pairs.len());
                for (name, values) in pairs {
                    append_pair(&mut map, name, values)?;
                }
                Ok(map)
            }
        }
    }
}

impl From<HeaderMap<String>> for HeaderSource {
    fn from(map: HeaderMap<String>) -> Self {
        HeaderSource::Collection(map)
    }
}

impl<K: Into<String>, V: Into<HeaderValues>> From<Vec<(K, V)>> for HeaderSource {
    fn from(pairs: Vec<(K, V)>) -> Self {
        HeaderSource::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<HeaderValues>, const N: usize> From<[(K, V); N]> for HeaderSource {
    fn from(pairs: [(K, V); N]) -> Self {
        HeaderSource::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Validates one raw name and appends its value(s) to a collection.
///
/// This is the single place a raw pair enters a `HeaderMap`, shared by batch
/// materialization and by incremental adds.
pub(crate) fn append_pair(
    map: &mut HeaderMap<String>,
    name: &str,
    values: &HeaderValues,
) -> Result<(), MessageError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| MessageError::invalid_header(format!("{name}: {e}")))?;
    for value in values.iter() {
        map.append(name.clone(), value.clone());
    }
    Ok(())
}

/// The header storage field of a message.
///
/// `Unset` materializes into an empty collection on first read. `Raw` holds
/// whatever [`HeaderSource`] the caller provided; a failed materialization
/// (invalid header name) leaves it in place, so the raw form is still
/// inspectable afterwards.
#[derive(Debug, Default)]
pub(crate) enum HeaderState {
    #[default]
    Unset,
    Raw(HeaderSource),
    Ready(HeaderMap<String>),
}

impl HeaderState {
    /// Returns the materialized collection, normalizing the raw form on the
    /// first call.
    pub(crate) fn materialize(&mut self) -> Result<&mut HeaderMap<String>, MessageError> {
        match self {
            HeaderState::Ready(_) => {}
            HeaderState::Unset => *self = HeaderState::Ready(HeaderMap::default()),
            HeaderState::Raw(source) => {
                let map = source.build_map()?;
                *self = HeaderState::Ready(map);
            }
        }
        match self {
            HeaderState::Ready(map) => Ok(map),
            HeaderState::Unset | HeaderState::Raw(_) => unreachable!("state was materialized above"),
        }
    }

    /// Peeks at the collection without materializing the raw form.
    pub(crate) fn ready(&self) -> Option<&HeaderMap<String>> {
        match self {
            HeaderState::Ready(map) => Some(map),
            HeaderState::Unset | HeaderState::Raw(_) => None,
        }
    }
}

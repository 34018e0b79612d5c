// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Position sources feeding the engine.
//!
//! Translating a device or daemon protocol into [`PositionSample`]s is the
//! source's job; the engine only sees well-formed samples.

use crate::sample::PositionSample;
use std::convert::Infallible;

/// Trait for anything producing position samples.
pub trait PositionSource {
    /// Acquisition error type.
    type Error;

    /// Next sample; `Ok(None)` when the stream has ended.
    fn next_sample(&mut self) -> Result<Option<PositionSample>, Self::Error>;
}

/// Source over an in-memory sequence of samples.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    inner: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = PositionSample>,
{
    pub fn new(samples: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            inner: samples.into_iter(),
        }
    }
}

impl<I> PositionSource for IterSource<I>
where
    I: Iterator<Item = PositionSample>,
{
    type Error = Infallible;

    fn next_sample(&mut self) -> Result<Option<PositionSample>, Self::Error> {
        Ok(self.inner.next())
    }
}

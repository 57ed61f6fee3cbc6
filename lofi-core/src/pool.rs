// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Generational arena for objects that are addressed by handles.
//!
//! Every record carries a generation that is bumped each time the record is reused. A handle
//! remembers the generation it was issued with, so a handle to a freed object never reaches the
//! object that later took its place.

use std::{
    fmt::{Debug, Display, Formatter},
    marker::PhantomData,
};

const INVALID_GENERATION: u32 = 0;

/// Non-owning, generation-checked reference to an object in a [`Pool`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    type_marker: PhantomData<fn() -> T>,
}

impl<T> Display for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.index, self.generation)
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Idx: {}; Gen: {}]", self.index, self.generation)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Handle<T> {
    /// Handle that never points to anything.
    pub const NONE: Handle<T> = Handle::new(0, INVALID_GENERATION);

    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            type_marker: PhantomData,
        }
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.generation == INVALID_GENERATION
    }
}

#[derive(Debug)]
struct Record<T> {
    generation: u32,
    payload: Option<T>,
}

/// Owns objects and hands out [`Handle`]s to them. Freed records are reused.
#[derive(Debug)]
pub struct Pool<T> {
    records: Vec<Record<T>>,
    free: Vec<u32>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            free: Vec::new(),
        }
    }

    #[must_use]
    pub fn spawn(&mut self, payload: T) -> Handle<T> {
        match self.free.pop() {
            Some(index) => {
                let record = &mut self.records[index as usize];
                record.generation += 1;
                record.payload = Some(payload);
                Handle::new(index, record.generation)
            }
            None => {
                let index = self.records.len() as u32;
                self.records.push(Record {
                    generation: 1,
                    payload: Some(payload),
                });
                Handle::new(index, 1)
            }
        }
    }

    fn record(&self, handle: Handle<T>) -> Option<&Record<T>> {
        self.records
            .get(handle.index as usize)
            .filter(|record| record.generation == handle.generation)
    }

    /// Returns `None` for stale, foreign or [`Handle::NONE`] handles.
    pub fn try_borrow(&self, handle: Handle<T>) -> Option<&T> {
        self.record(handle)?.payload.as_ref()
    }

    pub fn try_borrow_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.records
            .get_mut(handle.index as usize)
            .filter(|record| record.generation == handle.generation)?
            .payload
            .as_mut()
    }

    /// Moves the object out. Every handle to it becomes stale.
    pub fn try_free(&mut self, handle: Handle<T>) -> Option<T> {
        let payload = self
            .records
            .get_mut(handle.index as usize)
            .filter(|record| record.generation == handle.generation)?
            .payload
            .take()?;
        self.free.push(handle.index);
        Some(payload)
    }
}

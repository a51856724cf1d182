//! Groups and attributes accumulated by handler derivation.
//!
//! Each `with_group`/`with_attrs` call appends one [`Segment`] that points
//! at its parent, so derived handlers share everything bound before them
//! and the parent is never mutated.

use std::borrow::Cow;
use std::sync::Arc;

use crate::attr_writer::{write_attr, KeyPrefix};
use crate::value::Attr;

/// One entry of the accumulated state: either "open group `name`" or a
/// bound attribute.
#[derive(Clone, Debug)]
pub enum GroupOrAttr {
    Group(Cow<'static, str>),
    Attr(Attr),
}

#[derive(Debug)]
struct Segment {
    parent: Option<Arc<Segment>>,
    entries: Box<[GroupOrAttr]>,
    /// Dotted prefix of every group opened up to and including this segment.
    prefix: Arc<str>,
}

/// Persistent, append-only list of [`GroupOrAttr`] entries.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    tail: Option<Arc<Segment>>,
}

impl Scope {
    /// Dotted prefix applied to attributes added after this point, e.g. `"g1.g2."`.
    pub fn prefix(&self) -> &str {
        match &self.tail {
            Some(seg) => &*seg.prefix,
            None => "",
        }
    }

    /// Scope with the group `name` opened. An empty name is ignored.
    pub fn with_group(&self, name: impl Into<Cow<'static, str>>) -> Scope {
        let name = name.into();
        if name.is_empty() {
            return self.clone();
        }
        let prefix: Arc<str> = format!("{}{}.", self.prefix(), name).into();
        self.push(Box::new([GroupOrAttr::Group(name)]), prefix)
    }

    /// Scope with `attrs` bound under the current prefix, in order.
    pub fn with_attrs(&self, attrs: impl IntoIterator<Item = Attr>) -> Scope {
        let entries: Box<[GroupOrAttr]> = attrs.into_iter().map(GroupOrAttr::Attr).collect();
        if entries.is_empty() {
            return self.clone();
        }
        let prefix = self
            .tail
            .as_ref()
            .map_or_else(|| Arc::from(""), |seg| Arc::clone(&seg.prefix));
        self.push(entries, prefix)
    }

    fn push(&self, entries: Box<[GroupOrAttr]>, prefix: Arc<str>) -> Scope {
        Scope {
            tail: Some(Arc::new(Segment {
                parent: self.tail.clone(),
                entries,
                prefix,
            })),
        }
    }

    /// All entries from the first derivation to the last.
    pub fn entries(&self) -> Vec<GroupOrAttr> {
        let mut segments = Vec::new();
        let mut cursor = self.tail.as_deref();
        while let Some(seg) = cursor {
            segments.push(seg);
            cursor = seg.parent.as_deref();
        }
        segments
            .iter()
            .rev()
            .flat_map(|seg| seg.entries.iter().cloned())
            .collect()
    }

    /// Write the bound attributes, then every attribute of `record_attrs`,
    /// each under the group prefix in effect where it was added.
    pub fn write<'a>(
        &self,
        buf: &mut Vec<u8>,
        colorize: bool,
        record_attrs: impl IntoIterator<Item = &'a Attr>,
    ) {
        if let Some(tail) = &self.tail {
            write_segment(buf, colorize, tail);
        }
        let prefix = KeyPrefix::Scope(self.prefix());
        for attr in record_attrs {
            write_attr(buf, colorize, prefix, attr);
        }
    }
}

fn write_segment(buf: &mut Vec<u8>, colorize: bool, seg: &Segment) {
    if let Some(parent) = &seg.parent {
        write_segment(buf, colorize, parent);
    }
    // Group segments only move the prefix, which is already cached.
    let prefix = KeyPrefix::Scope(&*seg.prefix);
    for entry in seg.entries.iter() {
        if let GroupOrAttr::Attr(attr) = entry {
            write_attr(buf, colorize, prefix, attr);
        }
    }
}

//! Row decoding for `xctrace export` table queries.
//!
//! The export format interns repeated values: the first occurrence of a
//! column value carries `id="N"` and later rows reference it with
//! `ref="N"`. The decoder keeps one cache per value kind and resolves
//! back-references as it goes. A missing required column, a dangling ref or
//! an unparsable value is a `SchemaParse` error and aborts the conversion;
//! no partial sample list is ever returned.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::domain::{ConvertError, Library, Sample, ThreadInfo};
use crate::trace::schema::{TableSchema, BINARY_IMAGE_SCHEMA};

/// Fetch one attribute as an unescaped string.
pub(crate) fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// Interned values seen so far in one export document.
#[derive(Default)]
struct RefCaches {
    /// Numeric columns (times, weights, tids, frame addresses) by id.
    numbers: HashMap<u64, u64>,
    threads: HashMap<u64, ThreadInfo>,
    backtraces: HashMap<u64, Vec<u64>>,
    labels: HashMap<u64, String>,
    images: HashMap<u64, Library>,
}

/// Decode one sample table export into samples, per the table's column
/// tags. Row order is preserved.
pub fn decode_sample_rows(xml: &str, table: &TableSchema) -> Result<Vec<Sample>, ConvertError> {
    let schema = table.schema;
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut caches = RefCaches::default();
    let mut samples = Vec::new();

    loop {
        match read_event(&mut reader, schema)? {
            Event::Start(e) if e.local_name().as_ref() == b"row" => {
                samples.push(decode_row(&mut reader, &mut caches, table)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(samples)
}

/// Decode a `binary-load-info` export into libraries, in source order.
pub fn decode_image_rows(xml: &str) -> Result<Vec<Library>, ConvertError> {
    let schema = BINARY_IMAGE_SCHEMA;
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut caches = RefCaches::default();
    let mut images = Vec::new();
    let mut in_row = false;

    loop {
        match read_event(&mut reader, schema)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => in_row = true,
                b"binary" if in_row => {
                    images.push(decode_binary(&e, &mut caches, schema)?);
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"row" => in_row = false,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(images)
}

fn read_event<'a>(
    reader: &mut Reader<&'a [u8]>,
    schema: &'static str,
) -> Result<Event<'a>, ConvertError> {
    reader
        .read_event()
        .map_err(|e| ConvertError::schema(schema, format!("invalid XML: {e}")))
}

/// Decode one `<row>` subtree. The reader is positioned just past the row
/// start tag and is left just past its end tag.
fn decode_row(
    reader: &mut Reader<&[u8]>,
    caches: &mut RefCaches,
    table: &TableSchema,
) -> Result<Sample, ConvertError> {
    let schema = table.schema;
    let mut time: Option<u64> = None;
    let mut weight: Option<u64> = None;
    let mut thread: Option<ThreadInfo> = None;
    let mut stack: Option<Vec<u64>> = None;
    let mut label: Option<String> = None;

    loop {
        match read_event(reader, schema)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == table.time_tag.as_bytes() {
                    time = Some(read_number(reader, &e, false, caches, schema)?);
                } else if name == table.weight_tag.as_bytes() {
                    weight = Some(read_number(reader, &e, false, caches, schema)?);
                } else if name == b"thread" {
                    thread = Some(read_thread(reader, &e, false, caches, schema)?);
                } else if name == b"backtrace" {
                    stack = Some(read_backtrace(reader, &e, false, caches, schema)?);
                } else if table.label_tag.is_some_and(|t| name == t.as_bytes()) {
                    label = Some(read_label(reader, &e, false, caches, schema)?);
                } else {
                    skip_subtree(reader, &e, schema)?;
                }
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == table.time_tag.as_bytes() {
                    time = Some(read_number(reader, &e, true, caches, schema)?);
                } else if name == table.weight_tag.as_bytes() {
                    weight = Some(read_number(reader, &e, true, caches, schema)?);
                } else if name == b"thread" {
                    thread = Some(read_thread(reader, &e, true, caches, schema)?);
                } else if name == b"backtrace" {
                    stack = Some(read_backtrace(reader, &e, true, caches, schema)?);
                } else if table.label_tag.is_some_and(|t| name == t.as_bytes()) {
                    label = Some(read_label(reader, &e, true, caches, schema)?);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => break,
            Event::Eof => {
                return Err(ConvertError::schema(schema, "unterminated row"));
            }
            _ => {}
        }
    }

    let timestamp_ns = time
        .ok_or_else(|| ConvertError::schema(schema, format!("missing {} column", table.time_tag)))?;
    let weight_ns = weight.ok_or_else(|| {
        ConvertError::schema(schema, format!("missing {} column", table.weight_tag))
    })?;
    let thread = thread.ok_or_else(|| ConvertError::schema(schema, "missing thread column"))?;
    if let Some(tag) = table.label_tag {
        if label.is_none() {
            return Err(ConvertError::schema(schema, format!("missing {tag} column")));
        }
    }

    Ok(Sample {
        timestamp_ns,
        thread,
        category: table.category,
        stack: stack.unwrap_or_default(),
        weight_ns,
        label,
    })
}

fn parse_u64(text: &str, schema: &'static str) -> Result<u64, ConvertError> {
    text.trim()
        .parse::<u64>()
        .map_err(|_| ConvertError::schema(schema, format!("expected integer, got {text:?}")))
}

fn parse_addr(text: &str, schema: &'static str) -> Result<u64, ConvertError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| ConvertError::schema(schema, format!("expected hex address, got {text:?}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|_| ConvertError::schema(schema, format!("expected hex address, got {text:?}")))
}

fn id_of(e: &BytesStart<'_>, schema: &'static str) -> Result<Option<u64>, ConvertError> {
    attr(e, b"id").map(|v| parse_u64(&v, schema)).transpose()
}

fn ref_of(e: &BytesStart<'_>, schema: &'static str) -> Result<Option<u64>, ConvertError> {
    attr(e, b"ref").map(|v| parse_u64(&v, schema)).transpose()
}

fn dangling(schema: &'static str, id: u64) -> ConvertError {
    ConvertError::schema(schema, format!("dangling ref {id}"))
}

/// Numeric column: text content, interned by id.
fn read_number(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    empty: bool,
    caches: &mut RefCaches,
    schema: &'static str,
) -> Result<u64, ConvertError> {
    if let Some(id) = ref_of(e, schema)? {
        if !empty {
            skip_subtree(reader, e, schema)?;
        }
        return caches.numbers.get(&id).copied().ok_or_else(|| dangling(schema, id));
    }

    if empty {
        return Err(ConvertError::schema(schema, "numeric column without content"));
    }
    let text = read_text(reader, e, schema)?;
    let value = parse_u64(&text, schema)?;
    if let Some(id) = id_of(e, schema)? {
        caches.numbers.insert(id, value);
    }
    Ok(value)
}

/// Thread column: display name in `fmt`, numeric tid in a nested element.
fn read_thread(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    empty: bool,
    caches: &mut RefCaches,
    schema: &'static str,
) -> Result<ThreadInfo, ConvertError> {
    if let Some(id) = ref_of(e, schema)? {
        if !empty {
            skip_subtree(reader, e, schema)?;
        }
        return caches.threads.get(&id).cloned().ok_or_else(|| dangling(schema, id));
    }

    if empty {
        return Err(ConvertError::schema(schema, "thread column without a tid"));
    }

    let name = attr(e, b"fmt");
    let mut tid: Option<u64> = None;
    loop {
        match read_event(reader, schema)? {
            Event::Start(inner) => {
                if inner.local_name().as_ref() == b"tid" {
                    tid = Some(read_number(reader, &inner, false, caches, schema)?);
                } else {
                    skip_subtree(reader, &inner, schema)?;
                }
            }
            Event::Empty(inner) if inner.local_name().as_ref() == b"tid" => {
                tid = Some(read_number(reader, &inner, true, caches, schema)?);
            }
            Event::End(end) if end.local_name() == e.local_name() => break,
            Event::Eof => return Err(ConvertError::schema(schema, "unterminated thread column")),
            _ => {}
        }
    }

    let tid = tid.ok_or_else(|| ConvertError::schema(schema, "thread column without a tid"))?;
    let info = ThreadInfo { tid, name };
    if let Some(id) = id_of(e, schema)? {
        caches.threads.insert(id, info.clone());
    }
    Ok(info)
}

/// Backtrace column: nested `<frame addr="0x...">` children, leaf first.
fn read_backtrace(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    empty: bool,
    caches: &mut RefCaches,
    schema: &'static str,
) -> Result<Vec<u64>, ConvertError> {
    if let Some(id) = ref_of(e, schema)? {
        if !empty {
            skip_subtree(reader, e, schema)?;
        }
        return caches.backtraces.get(&id).cloned().ok_or_else(|| dangling(schema, id));
    }

    let mut frames = Vec::new();
    if !empty {
        loop {
            match read_event(reader, schema)? {
                Event::Start(inner) | Event::Empty(inner)
                    if inner.local_name().as_ref() == b"frame" =>
                {
                    frames.push(read_frame(&inner, caches, schema)?);
                }
                Event::End(end) if end.local_name() == e.local_name() => break,
                Event::Eof => {
                    return Err(ConvertError::schema(schema, "unterminated backtrace"));
                }
                _ => {}
            }
        }
    }

    if let Some(id) = id_of(e, schema)? {
        caches.backtraces.insert(id, frames.clone());
    }
    Ok(frames)
}

fn read_frame(
    e: &BytesStart<'_>,
    caches: &mut RefCaches,
    schema: &'static str,
) -> Result<u64, ConvertError> {
    if let Some(id) = ref_of(e, schema)? {
        return caches.numbers.get(&id).copied().ok_or_else(|| dangling(schema, id));
    }
    let addr = attr(e, b"addr")
        .ok_or_else(|| ConvertError::schema(schema, "frame without addr attribute"))?;
    let addr = parse_addr(&addr, schema)?;
    if let Some(id) = id_of(e, schema)? {
        caches.numbers.insert(id, addr);
    }
    Ok(addr)
}

/// Payload column: display string in `fmt`, falling back to text content.
fn read_label(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    empty: bool,
    caches: &mut RefCaches,
    schema: &'static str,
) -> Result<String, ConvertError> {
    if let Some(id) = ref_of(e, schema)? {
        if !empty {
            skip_subtree(reader, e, schema)?;
        }
        return caches.labels.get(&id).cloned().ok_or_else(|| dangling(schema, id));
    }

    let fmt = attr(e, b"fmt");
    let text = if empty { String::new() } else { read_text(reader, e, schema)? };
    let value = match fmt {
        Some(f) => f,
        None if !text.is_empty() => text,
        None => return Err(ConvertError::schema(schema, "label column without content")),
    };

    if let Some(id) = id_of(e, schema)? {
        caches.labels.insert(id, value.clone());
    }
    Ok(value)
}

/// Binary image entry, attributes only:
/// `<binary name=".." UUID=".." load-addr="0x.." text-size=".." path=".."/>`.
fn decode_binary(
    e: &BytesStart<'_>,
    caches: &mut RefCaches,
    schema: &'static str,
) -> Result<Library, ConvertError> {
    if let Some(id) = ref_of(e, schema)? {
        return caches.images.get(&id).cloned().ok_or_else(|| dangling(schema, id));
    }

    let name = attr(e, b"name")
        .ok_or_else(|| ConvertError::schema(schema, "binary without name attribute"))?;
    let load_addr = attr(e, b"load-addr")
        .ok_or_else(|| ConvertError::schema(schema, "binary without load-addr attribute"))?;
    let text_size = attr(e, b"text-size")
        .ok_or_else(|| ConvertError::schema(schema, "binary without text-size attribute"))?;

    let load_address_start = parse_addr(&load_addr, schema)?;
    let size = parse_u64(&text_size, schema)?;
    let library = Library {
        load_address_start,
        load_address_end: load_address_start.saturating_add(size),
        name,
        path: attr(e, b"path").unwrap_or_default(),
        identifier: attr(e, b"UUID").unwrap_or_default(),
    };

    if let Some(id) = id_of(e, schema)? {
        caches.images.insert(id, library.clone());
    }
    Ok(library)
}

fn read_text(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    schema: &'static str,
) -> Result<String, ConvertError> {
    reader
        .read_text(e.name())
        .map(|t| t.into_owned())
        .map_err(|err| ConvertError::schema(schema, format!("invalid XML: {err}")))
}

fn skip_subtree(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    schema: &'static str,
) -> Result<(), ConvertError> {
    reader
        .read_to_end(e.name())
        .map(|_| ())
        .map_err(|err| ConvertError::schema(schema, format!("invalid XML: {err}")))
}

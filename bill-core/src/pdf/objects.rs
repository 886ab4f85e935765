/// Indirect object number. Generation is always 0 in documents we write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(pub u32);

/// The subset of PDF object types (PDF 32000-1:2008 Section 7.3)
/// needed to describe a bill.
#[derive(Debug, Clone)]
pub enum PdfObject {
    Integer(i64),
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal string, stored unescaped.
    Text(String),
    Array(Vec<PdfObject>),
    /// Vec instead of a map keeps output order deterministic.
    Dict(Vec<(String, PdfObject)>),
    Stream {
        dict: Vec<(String, PdfObject)>,
        data: Vec<u8>,
    },
    Ref(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    pub fn text(s: &str) -> Self {
        PdfObject::Text(s.to_string())
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dict(owned_entries(entries))
    }

    pub fn stream(entries: Vec<(&str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream {
            dict: owned_entries(entries),
            data,
        }
    }

    /// `[0 0 w h]` rectangle array.
    pub fn media_box(width: f64, height: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Integer(0),
            PdfObject::Integer(0),
            PdfObject::Real(width),
            PdfObject::Real(height),
        ])
    }

    /// Append the PDF text form of this object to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            PdfObject::Integer(n) => out.extend_from_slice(n.to_string().as_bytes()),
            PdfObject::Real(f) => out.extend_from_slice(format_real(*f).as_bytes()),
            PdfObject::Name(name) => {
                out.push(b'/');
                out.extend_from_slice(name.as_bytes());
            }
            PdfObject::Text(s) => {
                out.push(b'(');
                out.extend_from_slice(&encode_literal(s));
                out.push(b')');
            }
            PdfObject::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }
                    item.encode(out);
                }
                out.push(b']');
            }
            PdfObject::Dict(entries) => encode_dict(entries, None, out),
            PdfObject::Stream { dict, data } => {
                encode_dict(dict, Some(data.len()), out);
                out.extend_from_slice(b"\nstream\n");
                out.extend_from_slice(data);
                out.extend_from_slice(b"\nendstream");
            }
            PdfObject::Ref(id) => out.extend_from_slice(format!("{} 0 R", id.0).as_bytes()),
        }
    }
}

fn owned_entries(entries: Vec<(&str, PdfObject)>) -> Vec<(String, PdfObject)> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Dictionary body; streams pass their length so `/Length` is always
/// the last key.
fn encode_dict(entries: &[(String, PdfObject)], length: Option<usize>, out: &mut Vec<u8>) {
    out.extend_from_slice(b"<<");
    for (key, val) in entries {
        out.extend_from_slice(b" /");
        out.extend_from_slice(key.as_bytes());
        out.push(b' ');
        val.encode(out);
    }
    if let Some(len) = length {
        out.extend_from_slice(format!(" /Length {}", len).as_bytes());
    }
    out.extend_from_slice(b" >>");
}

/// Encode a string as the body of a PDF literal string.
///
/// Builtin fonts use WinAnsi encoding: Latin-1 characters map to their
/// single byte, anything else becomes `?`. Delimiters are escaped.
pub fn encode_literal(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.extend_from_slice(b"\\\\"),
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            c if (c as u32) < 0x100 => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

/// Format a real number: at most four decimals, no trailing zeros,
/// never scientific notation.
pub fn format_real(f: f64) -> String {
    if f == f.floor() && f.abs() < 1e15 {
        return format!("{}", f as i64);
    }
    let s = format!("{:.4}", f);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

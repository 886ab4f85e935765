use std::io::{self, Write};

use crate::pdf::objects::{ObjId, PdfObject};

/// Serializes indirect objects to a `Write` target and remembers where
/// each one starts so the cross-reference table can be emitted last.
pub struct PdfWriter<W: Write> {
    inner: W,
    offset: usize,
    /// (object number, byte offset), in write order.
    offsets: Vec<(u32, usize)>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(inner: W) -> Self {
        PdfWriter {
            inner,
            offset: 0,
            offsets: Vec::new(),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    /// `%PDF-1.7` plus a comment of high-bit bytes marking the file as binary.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n")
    }

    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        self.offsets.push((id.0, self.offset));
        let mut body = format!("{} 0 obj\n", id.0).into_bytes();
        obj.encode(&mut body);
        body.extend_from_slice(b"\nendobj\n");
        self.write_bytes(&body)
    }

    pub fn current_offset(&self) -> usize {
        self.offset
    }

    /// Emit the xref table, trailer and `%%EOF`.
    ///
    /// Object numbers never written get a free entry, so gaps in the
    /// numbering still produce a valid table.
    pub fn finish(&mut self, root: ObjId, info: Option<ObjId>) -> io::Result<()> {
        let xref_start = self.offset;
        let size = self.offsets.iter().map(|&(num, _)| num).max().unwrap_or(0) + 1;

        let mut by_number = vec![None; size as usize];
        for &(num, off) in &self.offsets {
            by_number[num as usize] = Some(off);
        }

        let mut table = format!("xref\n0 {}\n", size).into_bytes();
        // Each entry is exactly 20 bytes, CRLF-terminated.
        table.extend_from_slice(b"0000000000 65535 f\r\n");
        for entry in by_number.iter().skip(1) {
            match entry {
                Some(off) => table.extend_from_slice(format!("{:010} 00000 n\r\n", off).as_bytes()),
                None => table.extend_from_slice(b"0000000000 00000 f\r\n"),
            }
        }

        table.extend_from_slice(format!("trailer\n<< /Size {} /Root {} 0 R", size, root.0).as_bytes());
        if let Some(info) = info {
            table.extend_from_slice(format!(" /Info {} 0 R", info.0).as_bytes());
        }
        table.extend_from_slice(format!(" >>\nstartxref\n{}\n%%EOF\n", xref_start).as_bytes());
        self.write_bytes(&table)?;
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_marks_binary() {
        let mut w = PdfWriter::new(Vec::new());
        w.write_header().unwrap();
        let buf = w.into_inner();
        assert!(buf.starts_with(b"%PDF-1.7\n%"));
        assert!(buf[10..14].iter().all(|b| *b >= 128));
    }

    #[test]
    fn tracks_offsets_for_xref() {
        let mut w = PdfWriter::new(Vec::new());
        w.write_header().unwrap();
        let first = w.current_offset();
        w.write_object(ObjId(1), &PdfObject::name("Catalog")).unwrap();
        w.finish(ObjId(1), None).unwrap();
        let out = String::from_utf8_lossy(&w.into_inner()).into_owned();
        assert!(out.contains(&format!("{:010} 00000 n\r\n", first)));
        assert!(out.contains("/Size 2 /Root 1 0 R >>"));
        assert!(out.ends_with("%%EOF\n"));
    }

    #[test]
    fn gaps_become_free_entries() {
        let mut w = PdfWriter::new(Vec::new());
        w.write_header().unwrap();
        w.write_object(ObjId(3), &PdfObject::Integer(7)).unwrap();
        w.write_object(ObjId(1), &PdfObject::name("Catalog")).unwrap();
        w.finish(ObjId(1), Some(ObjId(3))).unwrap();
        let out = String::from_utf8_lossy(&w.into_inner()).into_owned();
        assert!(out.contains("xref\n0 4\n"));
        assert_eq!(out.matches("0000000000 00000 f\r\n").count(), 1);
        assert!(out.contains("/Info 3 0 R"));
    }
}

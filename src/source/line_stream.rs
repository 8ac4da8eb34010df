use std::io::{self, BufRead};

/// Forward-only stream of raw lines, terminators included.
pub type LineStream<'a> = Box<dyn Iterator<Item = io::Result<Vec<u8>>> + 'a>;

/// Splits a buffered reader into raw byte lines without decoding them.
pub struct ByteLines<R: BufRead> {
    reader: R,
    done: bool,
}

impl<R: BufRead> ByteLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, done: false }
    }
}

impl<R: BufRead> Iterator for ByteLines<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut line = Vec::with_capacity(256);
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(line)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_lines() {
        let data: &[u8] = b"<PATDOC>\n\x93legacy\x94\r\n</PATDOC>";
        let lines: Vec<Vec<u8>> = ByteLines::new(data).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec![
            b"<PATDOC>\n".to_vec(),
            b"\x93legacy\x94\r\n".to_vec(),
            b"</PATDOC>".to_vec(),
        ]);
        assert_eq!(ByteLines::new(&b""[..]).count(), 0);
    }
}

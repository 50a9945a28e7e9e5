use std::io;

const INCREMENT: usize = 4096;
const THRESHOLD: usize = 100;

/// Growable buffer filled from a reader until the reader ends.
pub(crate) struct FillMoreBuffer<Read> {
    buffer: Vec<u8>,
    pos: usize,
    reader: Option<Read>,
}

impl<Read: io::Read> FillMoreBuffer<Read> {
    pub fn new(reader: Read) -> Self {
        Self {
            buffer: vec![0; INCREMENT],
            pos: 0,
            reader: Some(reader),
        }
    }

    pub fn fill_more(&mut self) -> io::Result<()> {
        let Some(reader) = &mut self.reader else {
            return Ok(());
        };

        if self.pos > self.buffer.len() - THRESHOLD {
            self.buffer.resize(self.buffer.len() + INCREMENT, 0);
        }

        let n = reader.read(&mut self.buffer[self.pos..])?;
        self.pos += n;

        if n == 0 {
            // Free readers as soon as possible.
            self.reader = None;
        }

        Ok(())
    }

    pub fn is_ended(&self) -> bool {
        self.reader.is_none()
    }

    pub fn consume(&mut self, amount: usize) {
        let max = amount.min(self.pos);
        self.buffer.copy_within(max..self.pos, 0);
        self.pos -= max;
    }

    /// Input read so far and not yet consumed.
    pub fn input(&self) -> &[u8] {
        &self.buffer[..self.pos]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fill_until_ended() -> io::Result<()> {
        let mut b = FillMoreBuffer::new(&b"hello"[..]);
        b.fill_more()?;
        assert_eq!(b.input(), b"hello");
        assert!(!b.is_ended());
        b.fill_more()?;
        assert_eq!(b.input(), b"hello");
        assert!(b.is_ended());
        Ok(())
    }

    #[test]
    fn consume_shifts() -> io::Result<()> {
        let mut b = FillMoreBuffer::new(&b"hello world"[..]);
        b.fill_more()?;
        b.consume(6);
        b.fill_more()?;
        assert_eq!(b.input(), b"world");
        b.consume(100);
        b.fill_more()?;
        assert_eq!(b.input(), b"");
        Ok(())
    }

    #[test]
    fn grows_past_increment() -> io::Result<()> {
        let input = vec![b'x'; INCREMENT * 2 + 7];
        let mut b = FillMoreBuffer::new(&input[..]);
        while !b.is_ended() {
            b.fill_more()?;
        }
        assert_eq!(b.input().len(), input.len());
        Ok(())
    }
}

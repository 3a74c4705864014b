use memchr::Memchr2;

/// One token of a `mappings` string.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Piece<'a> {
    /// The VLQ digits of one mapping. Never empty.
    Segment(&'a str),
    /// A `;`, which moves to the next generated line.
    LineEnd,
}

/// Walks a `mappings` string, yielding segments and line ends in order. Empty segments between
/// separators are dropped.
#[derive(Debug)]
pub(crate) struct Pieces<'a> {
    mappings: &'a str,
    start: usize,
    separators: Memchr2<'a>,
    pending_line_end: bool,
}

impl<'a> Pieces<'a> {
    pub fn new(mappings: &'a str) -> Self {
        Self {
            mappings,
            start: 0,
            separators: memchr::memchr2_iter(b';', b',', mappings.as_bytes()),
            pending_line_end: false,
        }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_line_end {
            self.pending_line_end = false;
            return Some(Piece::LineEnd);
        }

        loop {
            let end = match self.separators.next() {
                Some(end) => end,
                None => {
                    if self.start >= self.mappings.len() {
                        return None;
                    }
                    let segment = &self.mappings[self.start..];
                    self.start = self.mappings.len();
                    return Some(Piece::Segment(segment));
                }
            };

            let segment = &self.mappings[self.start..end];
            self.start = end + 1;
            let line_end = self.mappings.as_bytes()[end] == b';';

            match (segment.is_empty(), line_end) {
                (true, true) => return Some(Piece::LineEnd),
                (true, false) => continue,
                (false, line_end) => {
                    self.pending_line_end = line_end;
                    return Some(Piece::Segment(segment));
                }
            }
        }
    }
}

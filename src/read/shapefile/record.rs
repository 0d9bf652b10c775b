use super::cursor::ShpCursor;
use super::geometry::{read_shp_record, ShpRecord};
use super::shp::{ShpError, SHP_RECORD_HEADER_LENGTH};

/// Walks the records that follow the file header, until the buffer runs out.
///
/// Stops after the first error.
#[derive(Debug)]
pub struct ShpRecordIter<'a> {
    cursor: ShpCursor<'a>,
    n_records_read: usize,
    failed: bool,
}

impl<'a> ShpRecordIter<'a> {
    /// `cursor` must be positioned just past the file header.
    pub fn new(cursor: ShpCursor<'a>) -> ShpRecordIter<'a> {
        ShpRecordIter {
            cursor: cursor,
            n_records_read: 0,
            failed: false,
        }
    }

    pub fn n_records_read(&self) -> usize {
        self.n_records_read
    }

    /// Reads the 8-byte big-endian record header, then decodes exactly the
    /// content length it declares.
    fn read_record(&mut self) -> Result<Option<ShpRecord>, ShpError> {
        let offset = self.cursor.offset();
        let mut record_header = self.cursor.slice(SHP_RECORD_HEADER_LENGTH)?;
        let record_number = record_header.read_i32_be()?;
        let content_length = record_header.read_i32_be()?;
        trace!("Record number {} at byte {}: {} words", record_number, offset, content_length);

        if content_length < 0 {
            return Err(ShpError::TruncatedData {
                offset: self.cursor.offset(),
                needed: usize::max_value(),
                remaining: self.cursor.remaining(),
            });
        }

        let mut content = self.cursor.slice(content_length as usize * 2)?;
        let record = read_shp_record(&mut content, record_number)?;

        if !content.is_empty() {
            warn!("Record number {} has {} unread bytes at its end", record_number, content.remaining());
        }

        Ok(record)
    }
}

impl<'a> Iterator for ShpRecordIter<'a> {
    type Item = Result<Option<ShpRecord>, ShpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            None
        } else {
            let result = self.read_record();
            match result {
                Ok(_) => { self.n_records_read += 1; },
                Err(_) => { self.failed = true; },
            }
            Some(result)
        }
    }
}

//! ZIP archive analyzer
//!
//! ZIP structure (records are walked front to back):
//! - Local file header `PK\x03\x04`: fixed fields, file name, extra field,
//!   then the file data
//! - Data descriptor `PK\x07\x08`: sizes written after the data when the
//!   header had bit 3 of `flags` set
//! - Central directory header `PK\x01\x02`: one per entry
//! - End of central directory `PK\x05\x06`: counts, offsets and a comment

use super::field::FieldReader;
use super::traits::{AnalyzeResult, Analyzer};
use crate::codec::Encoding;
use crate::editor::ByteWindow;
use crate::error::{Error, Result};

const LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const DATA_DESCRIPTOR: &[u8] = b"PK\x07\x08";
const CENTRAL_HEADER: &[u8] = b"PK\x01\x02";
const END_OF_CENTRAL_DIR: &[u8] = b"PK\x05\x06";

/// Sizes follow the data in a descriptor record
const FLAG_DATA_DESCRIPTOR: usize = 0x0008;

/// ZIP archive analyzer
pub struct ZipAnalyzer;

impl ZipAnalyzer {
    fn local_header(window: &ByteWindow, address: usize) -> Result<(AnalyzeResult, usize)> {
        let mut record = AnalyzeResult::new("ZIP_HEADER");
        let mut reader = FieldReader::new(window, address);
        let values = &mut record.values;

        values.extend(reader.read_byte_array("signature", 4)?);
        values.push(reader.read("uint16_t version;")?);
        let flags = reader.read_value("uint16_t flags;", values)?;
        values.push(reader.read("uint16_t compression;")?);
        values.push(reader.read("uint16_t dos_time;")?);
        values.push(reader.read("uint16_t dos_date;")?);
        values.push(reader.read("uint32_t crc32;")?);
        let compressed_size = reader.read_value("uint32_t compressed_size;", values)?;
        values.push(reader.read("uint32_t uncompressed_size;")?);
        let name_length = reader.read_value("uint16_t file_name_length;", values)?;
        let extra_length = reader.read_value("uint16_t extra_field_length;", values)?;

        values.push(reader.read_text("filename", name_length, Encoding::Utf8)?);
        values.push(reader.read_opaque("extra_field", extra_length));

        // Streamed entries carry their size in the trailing descriptor
        let data_length = if compressed_size == 0 && flags & FLAG_DATA_DESCRIPTOR != 0 {
            match window.search(reader.address(), DATA_DESCRIPTOR) {
                Some(found) => found - reader.address(),
                None => window.window_end().saturating_sub(reader.address()),
            }
        } else {
            compressed_size
        };
        values.push(reader.read_opaque("data", data_length));

        Ok((record, reader.address()))
    }

    fn data_descriptor(window: &ByteWindow, address: usize) -> Result<(AnalyzeResult, usize)> {
        let mut record = AnalyzeResult::new("ZIP_HEADER(PK78)");
        let mut reader = FieldReader::new(window, address);

        record.values.extend(reader.read_byte_array("signature", 4)?);
        for line in [
            "uint32_t crc32;",
            "uint32_t compressed_size;",
            "uint32_t uncompressed_size;",
        ] {
            record.values.push(reader.read(line)?);
        }

        Ok((record, reader.address()))
    }

    fn central_header(window: &ByteWindow, address: usize) -> Result<(AnalyzeResult, usize)> {
        let mut record = AnalyzeResult::new("ZIP_CENTRAL_HEADER");
        let mut reader = FieldReader::new(window, address);
        let values = &mut record.values;

        values.extend(reader.read_byte_array("signature", 4)?);
        for line in [
            "uint16_t version_made;",
            "uint16_t version;",
            "uint16_t flags;",
            "uint16_t compression;",
            "uint16_t dos_time;",
            "uint16_t dos_date;",
            "uint32_t crc32;",
            "uint32_t compressed_size;",
            "uint32_t uncompressed_size;",
        ] {
            values.push(reader.read(line)?);
        }
        let name_length = reader.read_value("uint16_t file_name_length;", values)?;
        let extra_length = reader.read_value("uint16_t extra_field_length;", values)?;
        let comment_length = reader.read_value("uint16_t file_comment_length;", values)?;
        for line in [
            "uint16_t disk_number_start;",
            "uint16_t internal_file_attributes;",
            "uint32_t external_file_attributes;",
            "uint32_t position;",
        ] {
            values.push(reader.read(line)?);
        }

        values.push(reader.read_text("filename", name_length, Encoding::Utf8)?);
        values.push(reader.read_opaque("extra_field", extra_length));
        values.push(reader.read_text("file_comment", comment_length, Encoding::Utf8)?);

        Ok((record, reader.address()))
    }

    fn end_of_central_dir(window: &ByteWindow, address: usize) -> Result<(AnalyzeResult, usize)> {
        let mut record = AnalyzeResult::new("ZIP_END_HEADER");
        let mut reader = FieldReader::new(window, address);
        let values = &mut record.values;

        values.extend(reader.read_byte_array("signature", 4)?);
        for line in [
            "uint16_t number_of_disks;",
            "uint16_t disk_number_start;",
            "uint16_t number_of_disk_entries;",
            "uint16_t number_of_entries;",
            "uint32_t central_dir_size;",
            "uint32_t central_dir_offset;",
        ] {
            values.push(reader.read(line)?);
        }
        let comment_length = reader.read_value("uint16_t comment_length;", values)?;
        values.push(reader.read_text("comment", comment_length, Encoding::Utf8)?);

        Ok((record, reader.address()))
    }
}

impl Analyzer for ZipAnalyzer {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn detect(&self, window: &ByteWindow) -> bool {
        window.get_bytes(window.window_offset(), 2) == b"PK"
    }

    fn parse(&self, window: &ByteWindow) -> Result<Vec<AnalyzeResult>> {
        let mut records = Vec::new();
        let mut address = window.window_offset();

        loop {
            let signature = window.get_bytes(address, 4);
            let parsed = match signature {
                LOCAL_HEADER => Self::local_header(window, address),
                DATA_DESCRIPTOR => Self::data_descriptor(window, address),
                CENTRAL_HEADER => Self::central_header(window, address),
                END_OF_CENTRAL_DIR => Self::end_of_central_dir(window, address),
                _ => break,
            };

            match parsed {
                Ok((record, next)) => {
                    records.push(record);
                    address = next;
                }
                // Truncated record: keep what was recognized so far
                Err(Error::Range { address: at, .. }) => {
                    log::debug!("zip record at {:#x} is truncated at {:#x}", address, at);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }
}

//! CSV and JSON exporters for sample sequences.
//!
//! Non-finite values are written as `NaN`/`inf` in CSV and as `null` in JSON.

use std::io::Write;

use crate::ResultsResult;
use crate::types::Sample;

pub const CSV_HEADER: &str = "t,y_true,y_measured,reference,u,e";

/// Write samples as CSV with a header row.
pub fn write_csv<W: Write>(mut writer: W, samples: &[Sample]) -> ResultsResult<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for s in samples {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            s.t, s.y_true, s.y_measured, s.reference, s.u, s.e
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write samples as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, samples: &[Sample]) -> ResultsResult<()> {
    serde_json::to_writer_pretty(&mut writer, samples)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

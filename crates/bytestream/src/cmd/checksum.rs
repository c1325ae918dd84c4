use bytestream_frame::{calculate_sum, convert_sum};

use crate::cmd::{read_input, ChecksumArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_checksum, ChecksumReport, OutputFormat};

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = match &args.data {
        Some(data) => data.as_bytes().to_vec(),
        None => read_input(args.file.as_ref())?,
    };

    print_checksum(&report(&payload, args.endian), format);
    Ok(SUCCESS)
}

fn report(payload: &[u8], endian: bool) -> ChecksumReport {
    let sum = calculate_sum(payload, endian);
    ChecksumReport {
        size: payload.len(),
        endian,
        sum,
        stored: convert_sum(sum, endian),
    }
}

#[cfg(test)]
mod tests {
    use bytestream_frame::check_sum;

    use super::*;

    #[test]
    fn stored_value_verifies() {
        for endian in [false, true] {
            let report = report(b"sum me, please", endian);
            assert_eq!(report.size, 14);
            assert!(check_sum(&report.stored.to_ne_bytes(), report.sum, endian));
        }
    }

    #[test]
    fn empty_payload_sums_to_zero() {
        let report = report(b"", false);
        assert_eq!(report.sum, 0);
        assert_eq!(report.stored, u32::MAX);
    }
}

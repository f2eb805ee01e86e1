use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info, span, trace, warn, Level};
use typed_builder::TypedBuilder;

use crate::activity::{decode_packed, decode_plain, Sample};
use crate::bytes::Bytes;
use crate::output::{Activity, Rows};
use crate::parameters::{decode_parameters, ParameterValue};
use crate::record::{RecordHeader, RecordType, Summary, SEPARATOR};
use crate::timecode;
use crate::{Error, Result};

/// Decodes activity samples from a `log.bin` record stream.
///
/// The stream is read in a single forward pass. Parameters records provide the start time,
/// activity records provide samples, and every other record is skipped. Samples are
/// collected until `max_samples` rows have been filled; a record that would not fit ends
/// the pass with a warning and the rows decoded so far are returned.
///
/// # Example
/// ```no_run
/// use gt3x::Parser;
///
/// let parser = Parser::builder()
///     .max_samples(30 * 60 * 60 * 24)
///     .scale_factor(341.0)
///     .sample_rate(30)
///     .build();
/// let activity = parser.parse("log.bin").unwrap();
/// println!("{} samples starting {:?}", activity.len(), activity.start_datetime());
/// ```
#[derive(TypedBuilder, Debug, Clone)]
pub struct Parser {
    /// Maximum number of sample rows to decode.
    max_samples: usize,
    /// Device counts per g. Raw values are divided by this.
    scale_factor: f64,
    /// Samples per second, used to space timestamps within an activity record.
    sample_rate: u32,
    /// Log parameters and the final sample count at info level.
    #[builder(default)]
    verbose: bool,
    /// Log every activity record at debug level.
    #[builder(default)]
    debug: bool,
}

/// State carried over the records of a single pass.
struct State {
    rows: Rows,
    start_time: Option<u32>,
    summary: Summary,
    // Length of the current run of non-separator bytes, 0 when in sync
    desync_run: usize,
    warned_start_time: bool,
}

impl State {
    fn new(max_samples: usize) -> Self {
        State {
            rows: Rows::new(max_samples),
            start_time: None,
            summary: Summary::default(),
            desync_run: 0,
            warned_start_time: false,
        }
    }

    fn desync(&mut self, offset: usize, byte: u8) {
        if self.desync_run == 0 {
            warn!(offset, byte, "expected record separator; resynchronizing");
            self.summary.desync_events += 1;
        }
        self.desync_run += 1;
        self.summary.desync_bytes += 1;
    }

    fn resync(&mut self, offset: usize) {
        if self.desync_run > 0 {
            debug!(offset, skipped = self.desync_run, "resynchronized");
            self.desync_run = 0;
        }
    }

    fn start_time(&mut self) -> u32 {
        if let Some(start_time) = self.start_time {
            return start_time;
        }
        if !self.warned_start_time {
            warn!("activity before start time parameter; timestamps are relative to the epoch");
            self.warned_start_time = true;
        }
        0
    }
}

impl Parser {
    /// Decode the log at `path`.
    ///
    /// # Errors
    /// [Error::Open] if the file cannot be opened, [Error::Config] if the parser
    /// configuration is invalid, or [Error::Io] on any other read failure.
    pub fn parse<P>(&self, path: P) -> Result<Activity>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        self.validate()?;
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_reader(BufReader::new(file))
    }

    /// Decode a log record stream from `reader`.
    ///
    /// # Errors
    /// [Error::Config] if the parser configuration is invalid, or [Error::Io] on read
    /// failures other than end-of-stream.
    pub fn parse_reader<R>(&self, reader: R) -> Result<Activity>
    where
        R: Read,
    {
        self.validate()?;

        let span = span!(
            Level::DEBUG,
            "parse",
            max_samples = self.max_samples,
            sample_rate = self.sample_rate
        );
        let _guard = span.enter();

        let mut bytes = Bytes::new(reader);
        let mut state = State::new(self.max_samples);
        while self.next_record(&mut bytes, &mut state)? {}

        let num_samples = state.rows.len();
        if self.verbose {
            info!(
                samples = num_samples,
                records = state.summary.records,
                "sample size"
            );
        } else {
            debug!(
                samples = num_samples,
                records = state.summary.records,
                "sample size"
            );
        }

        Ok(state.rows.finish(
            self.scale_factor,
            state.start_time,
            self.sample_rate,
            state.summary,
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Config("sample rate must be greater than 0".to_string()));
        }
        if self.scale_factor == 0.0 || !self.scale_factor.is_finite() {
            return Err(Error::Config(format!(
                "scale factor must be finite and non-zero; got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }

    /// Process the record at the current stream position. Returns `false` when the pass
    /// is over, either because the stream has ended or the sample capacity is exhausted.
    fn next_record<R>(&self, bytes: &mut Bytes<R>, state: &mut State) -> Result<bool>
    where
        R: Read,
    {
        let Some(b) = bytes.next()? else {
            trace!(offset = bytes.offset(), "end of stream");
            return Ok(false);
        };
        if b != SEPARATOR {
            state.desync(bytes.offset() - 1, b);
            return Ok(true);
        }
        state.resync(bytes.offset() - 1);

        let mut buf = [0u8; RecordHeader::LEN];
        if !bytes.fill(&mut buf)? {
            debug!(offset = bytes.offset(), "stream ended in record header");
            return Ok(false);
        }
        let Some(header) = RecordHeader::decode(&buf) else {
            return Ok(false);
        };

        let num_samples = header.sample_count();
        if num_samples > state.rows.remaining() {
            warn!(
                samples = state.rows.len(),
                max_samples = self.max_samples,
                "max samples reached prematurely; stopping"
            );
            state.summary.truncated = true;
            return Ok(false);
        }
        state.summary.add(&header);

        let len = usize::from(header.payload_len);
        let complete = match header.record_type {
            RecordType::Parameters => {
                let payload = bytes.take(len)?;
                self.parameters(&payload, state);
                payload.len() == len
            }
            RecordType::Activity => {
                let payload = bytes.take(len)?;
                self.activity(&header, decode_packed(&payload, num_samples), state);
                payload.len() == len
            }
            RecordType::Activity2 => {
                let payload = bytes.take(len)?;
                self.activity(&header, decode_plain(&payload, num_samples), state);
                payload.len() == len
            }
            typ => {
                trace!(%typ, len, "skipping record");
                bytes.skip(len)?
            }
        };
        if !complete {
            debug!(offset = bytes.offset(), typ = %header.record_type, "stream ended in payload");
            return Ok(false);
        }

        // Checksum is not validated
        if bytes.next()?.is_none() {
            debug!(offset = bytes.offset(), "stream ended before checksum");
            return Ok(false);
        }
        Ok(true)
    }

    fn parameters(&self, payload: &[u8], state: &mut State) {
        for param in decode_parameters(payload) {
            let value = param.interpret();
            if let ParameterValue::StartTime(start_time) = value {
                state.start_time = Some(start_time);
            }
            if self.verbose {
                info!(
                    address = param.address,
                    key = param.key,
                    value = ?value,
                    "parameter"
                );
            }
        }
    }

    fn activity<I>(&self, header: &RecordHeader, samples: I, state: &mut State)
    where
        I: Iterator<Item = Sample>,
    {
        let start_time = state.start_time();
        if self.debug {
            debug!(
                start = state.rows.len(),
                records = header.sample_count(),
                timestamp = header.timestamp,
                "activity"
            );
        }
        for (i, sample) in samples.enumerate() {
            let ts = timecode::timestamp(header.timestamp, start_time, i, self.sample_rate);
            // capacity was checked against the record's sample count
            state.rows.push(sample, ts);
        }
    }
}

use chrono::{Local, TimeZone, Utc};

// Everything in storage is unix seconds, the API
// speaks RFC 3339.
// chrono formatting reference:
// https://docs.rs/chrono/0.4.19/chrono/format/strftime/index.html

pub fn current_timestamp() -> i64 {
  Local::now().timestamp()
}

pub fn timestamp_to_rfc3339(timestamp: i64) -> String {
  Utc.timestamp(timestamp, 0).to_rfc3339()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn epoch_formats_as_expected() {
    assert_eq!("1970-01-01T00:00:00+00:00", timestamp_to_rfc3339(0));
  }

  #[test]
  fn known_timestamp_formats_as_utc() {
    let result = timestamp_to_rfc3339(1615150740);
    assert_eq!("2021-03-07T20:59:00+00:00", result);
  }
}

//! CSV output for accumulated country results.

use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::Result;
use crate::types::UserRecord;

/// Fixed header row of every country CSV.
const CSV_HEADER: &str = "first_name,middle_name,last_name,badge_count";

/// Serializes a country's accumulated user list to a flat CSV table.
pub struct CountryWriter {
    output_dir: PathBuf,
}

impl CountryWriter {
    /// Create a writer targeting the given output directory.
    ///
    /// The directory is created on first write if absent.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write one CSV for a country, returning its path.
    ///
    /// The file is always written, even for an empty user list, so every
    /// requested country leaves exactly one file behind. Rows keep the order
    /// they were accumulated in. A prior file for the same country is
    /// overwritten in place.
    pub fn write(&self, country: &str, users: &[UserRecord]) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.output_path(country);
        let mut out = BufWriter::new(fs::File::create(&path)?);

        out.write_all(CSV_HEADER.as_bytes())?;
        out.write_all(b"\r\n")?;
        for user in users {
            write!(
                out,
                "{},{},{},{}\r\n",
                csv_field(&user.first_name),
                csv_field(&user.middle_name),
                csv_field(&user.last_name),
                user.badge_count,
            )?;
        }
        out.flush()?;

        tracing::info!(
            country = %country,
            path = %path.display(),
            users = users.len(),
            "csv written"
        );
        Ok(path)
    }

    /// Path the CSV for a country lands at.
    pub fn output_path(&self, country: &str) -> PathBuf {
        self.output_dir
            .join(format!("github-certs-{}.csv", country_slug(country)))
    }
}

/// Filename slug for a country: lowercased, spaces become hyphens.
pub fn country_slug(country: &str) -> String {
    country.to_lowercase().replace(' ', "-")
}

/// Quote a field when it contains a delimiter, quote, or line break;
/// embedded quotes are doubled.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(first: &str, middle: &str, last: &str, badges: u64) -> UserRecord {
        UserRecord {
            id: Some(format!("{first}-{last}")),
            first_name: first.to_string(),
            middle_name: middle.to_string(),
            last_name: last.to_string(),
            badge_count: badges,
        }
    }

    // --- slug ---

    #[test]
    fn slug_lowercases_and_hyphenates_spaces() {
        assert_eq!(country_slug("United States"), "united-states");
        assert_eq!(country_slug("Brazil"), "brazil");
        assert_eq!(country_slug("Papua New Guinea"), "papua-new-guinea");
        assert_eq!(country_slug("JAPAN"), "japan");
    }

    // --- file naming ---

    #[test]
    fn output_path_uses_slugged_filename() {
        let writer = CountryWriter::new("datasource");
        assert_eq!(
            writer.output_path("United States"),
            PathBuf::from("datasource/github-certs-united-states.csv")
        );
    }

    // --- writing ---

    #[test]
    fn writes_header_and_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let writer = CountryWriter::new(dir.path());
        let users = vec![
            user("Ana", "", "Silva", 3),
            user("Bruno", "M", "Costa", 0),
        ];

        let path = writer.write("Portugal", &users).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert_eq!(
            content,
            "first_name,middle_name,last_name,badge_count\r\n\
             Ana,,Silva,3\r\n\
             Bruno,M,Costa,0\r\n"
        );
    }

    #[test]
    fn empty_user_list_still_writes_header_only_file() {
        let dir = TempDir::new().unwrap();
        let writer = CountryWriter::new(dir.path());

        let path = writer.write("Andorra", &[]).unwrap();

        assert!(path.exists(), "a zero-user country must still leave a file");
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first_name,middle_name,last_name,badge_count\r\n");
    }

    #[test]
    fn rerun_overwrites_prior_file_in_place() {
        let dir = TempDir::new().unwrap();
        let writer = CountryWriter::new(dir.path());

        writer
            .write("Chile", &[user("Ana", "", "Rios", 1), user("Beto", "", "Lagos", 2)])
            .unwrap();
        let path = writer.write("Chile", &[user("Cata", "", "Vera", 9)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "first_name,middle_name,last_name,badge_count\r\nCata,,Vera,9\r\n",
            "a rerun must fully replace the prior table"
        );
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out").join("tables");
        let writer = CountryWriter::new(&nested);

        let path = writer.write("Kenya", &[]).unwrap();

        assert!(nested.is_dir());
        assert!(path.starts_with(&nested));
    }

    // --- quoting ---

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        let dir = TempDir::new().unwrap();
        let writer = CountryWriter::new(dir.path());
        let users = vec![user("Anne, Marie", "", "O\"Neil", 2)];

        let path = writer.write("Ireland", &users).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(
            content.contains("\"Anne, Marie\",,\"O\"\"Neil\",2\r\n"),
            "comma fields must be quoted and embedded quotes doubled: {content}"
        );
    }

    #[test]
    fn plain_fields_stay_unquoted() {
        let dir = TempDir::new().unwrap();
        let writer = CountryWriter::new(dir.path());

        let path = writer.write("Norway", &[user("Astrid", "", "Berg", 1)]).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(content.contains("Astrid,,Berg,1\r\n"));
        assert!(!content.contains('"'));
    }
}

use std::{fs, io};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads a text file into its lines. Fails on the first unreadable line.
pub(crate) fn file_to_vec(path: &Path) -> io::Result<Vec<String>> {
    let file_in = fs::File::open(path)?;
    let file_reader = BufReader::new(file_in);
    file_reader.lines().collect()
}

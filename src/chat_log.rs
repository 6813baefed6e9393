use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

/// Appends timestamped lines of channel traffic to one file per day,
/// `<dir>/YYYYMMDD.log`.
pub struct ChatLog {
    dir: PathBuf,
    current: Option<(NaiveDate, File)>,
}

impl ChatLog {

    /// Opens a log rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P, debug: bool) -> io::Result<ChatLog> {
        let dir = dir.as_ref().to_path_buf();
        let created = !dir.exists();
        if created {
            fs::create_dir_all(&dir)?;
        }
        let mut log = ChatLog{
            dir: dir,
            current: None,
        };
        if created && debug {
            log.log("Ensured the log directory exists.")?;
        }
        Ok(log)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.log", day.format("%Y%m%d")))
    }

    pub fn log(&mut self, message: &str) -> io::Result<()> {
        self.log_at(Local::now().naive_local(), message)
    }

    pub fn log_at(&mut self, when: NaiveDateTime, message: &str) -> io::Result<()> {
        let file = self.file_for(when.date())?;
        writeln!(file, "[{}] {}", when.format("%Y-%m-%d %H:%M:%S"), message)?;
        file.flush()
    }

    fn file_for(&mut self, day: NaiveDate) -> io::Result<&mut File> {
        let stale = match self.current {
            Some((open_day, _)) => open_day != day,
            None => true,
        };
        if stale {
            let path = self.path_for(day);
            debug!("Opening chat log {}.", path.display());
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            self.current = Some((day, file));
        }
        match self.current {
            Some((_, ref mut file)) => Ok(file),
            None => Err(io::Error::new(io::ErrorKind::Other, "chat log has no open file")),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("logs");
        let log = ChatLog::open(&dir, false).unwrap();
        assert!(dir.is_dir());
        assert_eq!(log.dir(), dir.as_path());
        // Nothing is written unless asked to.
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn debug_notes_new_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        ChatLog::open(&dir, true).unwrap();
        let files: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(files.len(), 1);
        let contents = fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
        assert!(contents.ends_with("] Ensured the log directory exists.\n"));
    }

    #[test]
    fn same_day_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let mut log = ChatLog::open(tmp.path(), false).unwrap();
        log.log_at(at(2013, 2, 7, 9, 5, 1), "alice: hi").unwrap();
        log.log_at(at(2013, 2, 7, 9, 5, 30), "bob: hello").unwrap();
        let contents = fs::read_to_string(tmp.path().join("20130207.log")).unwrap();
        assert_eq!(contents, "[2013-02-07 09:05:01] alice: hi\n[2013-02-07 09:05:30] bob: hello\n");
    }

    #[test]
    fn midnight_starts_new_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut log = ChatLog::open(tmp.path(), false).unwrap();
        log.log_at(at(2013, 12, 31, 23, 59, 59), "late").unwrap();
        log.log_at(at(2014, 1, 1, 0, 0, 0), "early").unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("20131231.log")).unwrap(),
                   "[2013-12-31 23:59:59] late\n");
        assert_eq!(fs::read_to_string(tmp.path().join("20140101.log")).unwrap(),
                   "[2014-01-01 00:00:00] early\n");
    }

    #[test]
    fn reopening_appends() {
        let tmp = tempfile::tempdir().unwrap();
        ChatLog::open(tmp.path(), false).unwrap().log_at(at(2013, 2, 7, 1, 0, 0), "one").unwrap();
        ChatLog::open(tmp.path(), false).unwrap().log_at(at(2013, 2, 7, 2, 0, 0), "two").unwrap();
        let contents = fs::read_to_string(tmp.path().join("20130207.log")).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}

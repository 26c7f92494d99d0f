use std::any::TypeId;
use std::cell::RefCell;
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use rustc_hash::FxHashMap;

use crate::context::Context;
use crate::error::EpidemicError;
use crate::log::trace;

pub trait Report: 'static {
    // Returns report type
    fn type_id(&self) -> TypeId;
    // Serializes the data with the correct writer
    fn serialize(&self, writer: &mut Writer<File>) -> Result<(), csv::Error>;
}

/// Use this macro to define a unique report type
#[macro_export]
macro_rules! define_report {
    ($name:ident) => {
        impl $crate::report::Report for $name {
            fn type_id(&self) -> std::any::TypeId {
                std::any::TypeId::of::<$name>()
            }

            fn serialize(
                &self,
                writer: &mut $crate::csv::Writer<std::fs::File>,
            ) -> Result<(), $crate::csv::Error> {
                writer.serialize(self)
            }
        }
    };
}

/// Where report files go and what they are called: `<directory>/<file_prefix><name>.csv`.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub directory: PathBuf,
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            file_prefix: String::new(),
            directory: PathBuf::from("."),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    pub fn file_prefix(&mut self, file_prefix: String) -> &mut ReportOptions {
        self.file_prefix = file_prefix;
        self
    }

    pub fn directory(&mut self, directory: PathBuf) -> &mut ReportOptions {
        self.directory = directory;
        self
    }

    pub fn overwrite(&mut self, overwrite: bool) -> &mut ReportOptions {
        self.overwrite = overwrite;
        self
    }

    fn path_for(&self, short_name: &str) -> PathBuf {
        self.directory
            .join(format!("{}{short_name}.csv", self.file_prefix))
    }
}

// Maps report type to file writer
#[derive(Default)]
pub struct ReportStore {
    options: ReportOptions,
    file_writers: RefCell<FxHashMap<TypeId, Writer<File>>>,
}

// Checks that the path is a CSV and may be written. Creates all parent directories if they do
// not exist. Called by `add_report`.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, EpidemicError> {
    if path.extension().and_then(OsStr::to_str) != Some("csv") {
        return Err(EpidemicError::ReportError(
            "Report output files must be CSVs".to_string(),
        ));
    }
    if path.exists() && !overwrite {
        return Err(EpidemicError::ReportError(format!(
            "file already exists: {}. Please set `overwrite` to true to replace it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

pub trait ContextReportExt {
    /// Gives mutable access to the options used by subsequent `add_report` calls.
    fn report_options(&mut self) -> &mut ReportOptions;

    /// Registers a report type, creating `<directory>/<prefix><short_name>.csv`.
    ///
    /// # Errors
    ///
    /// Returns an `EpidemicError` if the file exists and overwriting is off, or the file
    /// cannot be created.
    fn add_report<T: Report + 'static>(&mut self, short_name: &str) -> Result<(), EpidemicError>;

    /// Write a new row with columns following items in the report struct
    /// to the report file associated with the report type struct.
    ///
    /// # Errors
    ///
    /// Returns `EpidemicError::ReportError` if the report type was never added, or the
    /// underlying csv error if the row cannot be written.
    fn send_report<T: Report>(&self, report: T) -> Result<(), EpidemicError>;
}

impl ContextReportExt for Context {
    fn report_options(&mut self) -> &mut ReportOptions {
        &mut self.reports.options
    }

    fn add_report<T: Report + 'static>(&mut self, short_name: &str) -> Result<(), EpidemicError> {
        let path = self.reports.options.path_for(short_name);
        let file = generate_validate_filepath(&path, self.reports.options.overwrite)?;
        trace!("writing {short_name} report to {}", path.display());
        self.reports
            .file_writers
            .borrow_mut()
            .insert(TypeId::of::<T>(), Writer::from_writer(file));
        Ok(())
    }

    fn send_report<T: Report>(&self, report: T) -> Result<(), EpidemicError> {
        let mut writers = self.reports.file_writers.borrow_mut();
        let writer = writers.get_mut(&report.type_id()).ok_or_else(|| {
            EpidemicError::ReportError("No writer found for the report type".to_string())
        })?;
        report.serialize(writer)?;
        writer.flush()?;
        Ok(())
    }
}

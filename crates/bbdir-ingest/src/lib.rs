#![deny(unsafe_code)]

pub mod catalogue;
pub mod clean;
pub mod error;
pub mod finder;
pub mod report;
pub mod workbook;

pub use catalogue::{JsonSampleCatalogue, NoCatalogue, Sample, SampleCatalogue};
pub use clean::{clean_record, clean_records};
pub use error::{IngestError, Result};
pub use finder::{
    Address, BiobankCore, Biomaterials, CodeField, DiseaseEntry, DonorCount,
    FinderRecord, MainContact, OrganizationId, load_finder, parse_finder, write_finder,
};
pub use report::write_id_csv;
pub use workbook::{read_sheets, read_workbook, write_delta, write_sheets, write_workbook};

//! Writing the session out: CSV files and a bar chart of counts per frame.

mod csv_export;
mod export_error;
mod plot;

pub use csv_export::{
    export_csv, export_sightings_csv, load_csv, load_sightings_csv, COUNTS_HEADER,
    SIGHTINGS_HEADER,
};
pub use export_error::{ExportError, PlotError};
pub use plot::{plot_counts, render_counts_chart};

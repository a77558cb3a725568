pub mod plot_executor;

pub use plot_executor::{PlotBackend, PythonPlotExecutor, PNG_SIGNATURE};

//! NetCDF reader for ADCIRC and SWAN model output.
//!
//! Opens product files (`fort.63.nc`, `swan_HS.63.nc`, `maxele.63.nc`, ...)
//! from disk or from a THREDDS OPeNDAP endpoint and returns plain vectors:
//! mesh coordinates and depths, the model time axis, and product values over
//! a node range or at chosen nodes.
//!
//! All reads are blocking; async callers should wrap them in
//! `tokio::task::spawn_blocking`.

pub mod dataset;
pub mod error;

use std::sync::Once;

pub use dataset::{AdcircDataset, MeshArrays};
pub use error::{NetCdfError, NetCdfResult};

/// Turn off HDF5's automatic error printing.
///
/// Probing for optional attributes such as `_FillValue` makes the HDF5 C
/// library dump `HDF5-DIAG` stacks to stderr even though the miss is handled.
/// [`AdcircDataset::open`] calls this; repeated calls are no-ops.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: null handler and client data turn HDF5 auto-reporting off for
        // the default error stack; H5Eset_auto2 holds the library lock.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

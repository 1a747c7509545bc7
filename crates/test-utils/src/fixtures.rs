//! Common test fixtures for ADCIRC extraction tests.
//!
//! Coordinates, run dates and catalog pages that show up in several crates'
//! tests.

/// Bounding boxes as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Carteret County, NC coastal extraction window.
    pub const CARTERET: (f64, f64, f64, f64) = (-78.148505, 34.206229, -75.245367, 35.132368);
}

/// Monitoring wells as (name, lon, lat, strategy tag).
pub mod wells {
    pub const SHACKLEFORD_BANKS: (&str, f64, f64, &str) =
        ("Shackleford Banks", -76.552499, 34.64928, "DIAG");

    pub const SOUTH_CORE_BANKS: (&str, f64, f64, &str) =
        ("South Core Banks", -76.496324, 34.661199, "NS");
}

/// Run dates in `YYYYMMDDHH` form.
pub mod runs {
    /// Last nc6b run before the mesh switch.
    pub const LAST_NC6B: &str = "2017080218";

    /// First run published on the hsofs mesh.
    pub const FIRST_HSOFS: &str = "2017080300";

    /// The one cycle before the switch that used hsofs.
    pub const EARLY_HSOFS: &str = "2017091500";
}

/// Trimmed THREDDS catalog pages.
pub mod catalog {
    /// A run directory listing that only carries the nc6b grid.
    pub const NC6B_RUN: &str = r#"<html><body><table>
<tr><td><a href="nc6b/catalog.html"><tt>nc6b/</tt></a></td></tr>
</table></body></html>"#;

    /// A run directory listing that only carries the hsofs grid.
    pub const HSOFS_RUN: &str = r#"<html><body><table>
<tr><td><a href="hsofs/catalog.html"><tt>hsofs/</tt></a></td></tr>
</table></body></html>"#;

    /// A grid directory listing with both forecast and nowcast runs.
    pub const GRID_WITH_NOWCAST: &str = r#"<html><body><table>
<tr><td><a href="namforecast/catalog.html"><tt>namforecast/</tt></a></td></tr>
<tr><td><a href='nowcast/catalog.html'><tt>nowcast/</tt></a></td></tr>
</table></body></html>"#;

    /// A grid directory listing with only a forecast run.
    pub const GRID_FORECAST_ONLY: &str = r#"<html><body><table>
<tr><td><a href="namforecast/catalog.html"><tt>namforecast/</tt></a></td></tr>
</table></body></html>"#;
}

/// `time:units` attribute values seen in ADCIRC output.
pub mod time_units {
    pub const FORT63: &str = "seconds since 2017-08-02 18:00:00";
}

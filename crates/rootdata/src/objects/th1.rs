//! TH1 histogram deserialization.
//!
//! Layout of a `TH1D` (likewise `TH1F/I/S/C`) payload:
//! ```text
//! TH1D version
//!   └─ TH1 (byte-counted; members per the TH1 layout)
//!        ├─ TNamed, TAttLine, TAttFill, TAttMarker
//!        ├─ fNcells (i32)
//!        ├─ fXaxis (byte-counted TAxis: ..., fNbins, fXmin, fXmax, fXbins)
//!        ├─ fYaxis, fZaxis, statistics, fContour
//!        ├─ fSumw2 (TArrayD: n i32 + n × f64)
//!        └─ ...
//!   └─ TArray? with the bin contents (n i32 + n × subtype)
//! ```
//! Members are reached through the schema navigator rather than fixed
//! offsets, so files from other ROOT versions work when they carry
//! streamer info.

use crate::error::{Result, RootError};
use crate::histogram::BinPars;
use crate::navigator::{Counters, advance_to};
use crate::rbuffer::RBuffer;
use crate::streamer::{SchemaField, SchemaRegistry};
use crate::tree::ContentType;

/// Read `fNcells`, the bin count including under- and overflow.
pub fn read_bin_count(payload: &[u8], schemas: &SchemaRegistry) -> Result<usize> {
    let th1 = schemas.require("TH1")?;
    let mut r = RBuffer::new(payload);
    let mut counters = Counters::new();
    r.read_version()?; // TH1D/F/I/S/C
    r.read_version()?; // TH1
    advance_to(&mut r, "TH1", th1, None, "fNcells", &mut counters)?;
    Ok(r.read_i32()?.max(0) as usize)
}

/// Decode all bins of a histogram whose content is stored as `content_type`.
pub fn read_bins(
    payload: &[u8],
    content_type: ContentType,
    schemas: &SchemaRegistry,
) -> Result<Vec<BinPars>> {
    let th1 = schemas.require("TH1")?;
    let taxis = schemas.require("TAxis")?;
    let mut r = RBuffer::new(payload);
    let mut counters = Counters::new();

    r.read_version()?; // TH1D/F/I/S/C
    let (_, th1_end) = r.read_counted_version("TH1")?;

    advance_to(&mut r, "TH1", th1, None, "fNcells", &mut counters)?;
    let n_cells = r.read_i32()?;
    if n_cells < 3 {
        return Err(RootError::Deserialization(format!(
            "histogram with {} cells is malformed",
            n_cells
        )));
    }
    let n = n_cells as usize;
    let mut bins = vec![BinPars::default(); n];
    bins[0].lowedge = f64::NEG_INFINITY;

    advance_to(&mut r, "TH1", th1, Some("fNcells"), "fXaxis", &mut counters)?;
    let (_, axis_end) = r.read_counted_version("TAxis")?;
    read_edges(&mut r, taxis, &mut bins, &mut counters)?;
    r.set_pos(axis_end)?;

    advance_to(&mut r, "TH1", th1, Some("fXaxis"), "fSumw2", &mut counters)?;
    if r.read_i32()? == n_cells {
        for bin in bins.iter_mut() {
            bin.sumw2 = r.read_f64()?;
        }
    }

    r.set_pos(th1_end)?;
    if r.read_i32()? == n_cells {
        for bin in bins.iter_mut() {
            bin.content = content_type.read_value::<f64>(&mut r, true)?;
        }
    }

    Ok(bins)
}

/// Fill `bins[1..]` lower edges from the x axis; the cursor sits inside it.
fn read_edges(
    r: &mut RBuffer,
    taxis: &[SchemaField],
    bins: &mut [BinPars],
    counters: &mut Counters,
) -> Result<()> {
    advance_to(r, "TAxis", taxis, None, "fNbins", counters)?;
    let nbins = r.read_i32()?;
    advance_to(r, "TAxis", taxis, Some("fNbins"), "fXmin", counters)?;
    let xmin = r.read_f64()?;
    advance_to(r, "TAxis", taxis, Some("fXmin"), "fXmax", counters)?;
    let xmax = r.read_f64()?;
    advance_to(r, "TAxis", taxis, Some("fXmax"), "fXbins", counters)?;

    let stored = r.read_i32()?;
    if stored > 0 && stored as usize == bins.len() - 1 {
        for bin in bins[1..].iter_mut() {
            bin.lowedge = r.read_f64()?;
        }
    } else {
        let scale = (xmax - xmin) / nbins as f64;
        for (i, bin) in bins[1..].iter_mut().enumerate() {
            bin.lowedge = i as f64 * scale + xmin;
        }
    }
    Ok(())
}

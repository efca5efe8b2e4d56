//! Pipeline stages for invoice capture, export and persistence.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap an
//! implementation (a different storage backend, a different page size)
//! without touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! logo ──▶ layout ──▶ capture ──▶ export (PDF download)
//! (resolve) (view)    (bitmap)  └▶ upload ──▶ store (save)
//!                                  (thumbnail,   (record)
//!                                   logo)
//! ```
//!
//! 1. [`logo`]    — resolve the logo asset (URL, path or absent) to decoded
//!    bytes before layout, so remote images never corrupt a capture
//! 2. [`capture`] — rasterise the laid-out view at 2× onto opaque white;
//!    CPU-bound, run under `spawn_blocking` by the orchestrators
//! 3. [`export`]  — slice the bitmap into printable pages and write the PDF
//! 4. [`upload`]  — object-storage seam + the Cloudinary-shaped client;
//!    the first stage with network I/O
//! 5. [`store`]   — invoice-store seam + the REST client

pub mod capture;
pub mod export;
pub mod logo;
pub mod store;
pub mod upload;

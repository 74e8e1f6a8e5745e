pub mod labeling;
pub mod rmsd_log;
pub mod sdf;

/// Reference plane the annotations are picked against.
pub mod floor;

/// LAS/LAZ point-cloud loading and display.
pub mod point_cloud;

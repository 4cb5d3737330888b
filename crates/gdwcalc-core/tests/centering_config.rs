use gdwcalc_core::{CenteringConvention, CenteringMode, DieStatus, ParameterError, WaferGeometry};

#[test]
fn test_convention_parsing() {
    let conv: CenteringConvention = "even, odd".parse().unwrap();
    assert_eq!(conv, CenteringConvention::CANONICAL[2]);
    assert_eq!(conv.to_string(), "X: even, Y: odd");

    let conv: CenteringConvention = "0.25mm,-1.5".parse().unwrap();
    assert_eq!(conv.x, CenteringMode::Fixed(0.25));
    assert_eq!(conv.y, CenteringMode::Fixed(-1.5));

    for bad in ["odd", "odd,even,odd", "nan,odd", "odd,inf", "left,right"] {
        assert!(
            matches!(
                bad.parse::<CenteringConvention>(),
                Err(ParameterError::InvalidCentering { .. })
            ),
            "{bad}"
        );
    }
}

#[test]
fn test_fixed_offset_uses_own_axis() {
    let conv = CenteringConvention::fixed(1.0, 1.0).unwrap();
    let (gx, gy) = conv.grid_offset((2.0, 4.0));
    assert_eq!(gx, 0.5);
    assert_eq!(gy, 0.25);
}

#[test]
fn test_geometry_rejects_bad_input() {
    assert!(WaferGeometry::new((0.0, 5.0), 150.0, 5.0, 5.0).is_err());
    assert!(WaferGeometry::new((5.0, 5.0), -1.0, 5.0, 5.0).is_err());
    assert!(WaferGeometry::new((5.0, 5.0), 150.0, -0.1, 5.0).is_err());
    assert!(WaferGeometry::new((5.0, 5.0), f64::NAN, 5.0, 5.0).is_err());

    let geo = WaferGeometry::new((5.0, 5.0), 150.0, 0.0, 0.0).unwrap();
    assert_eq!(geo.exclusion_radius_sq(), 75.0 * 75.0);
    assert!(geo.with_scribe_limit(Some(f64::INFINITY)).is_err());
}

#[test]
fn test_status_serialization_names() {
    let names: Vec<String> = [
        DieStatus::Wafer,
        DieStatus::Flat,
        DieStatus::Excl,
        DieStatus::FlatExcl,
        DieStatus::Scribe,
        DieStatus::Probe,
    ]
    .iter()
    .map(|s| serde_json::to_string(s).unwrap())
    .collect();
    assert_eq!(
        names,
        [
            "\"wafer\"",
            "\"flat\"",
            "\"excl\"",
            "\"flatExcl\"",
            "\"scribe\"",
            "\"probe\"",
        ]
    );
}

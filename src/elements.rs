pub const DEFAULT_COLOR: [f32; 3] = [0.7, 0.7, 0.7];
pub const DEFAULT_RADIUS: f32 = 0.8;
pub const BOND_COLOR: [f32; 3] = [0.6, 0.6, 0.6];

pub fn element_color(element: &str) -> [f32; 3] {
    match element.trim().to_ascii_uppercase().as_str() {
        "H" => [1.0, 1.0, 1.0],
        "O" => [1.0, 0.2, 0.2],
        "C" => [0.2, 0.2, 0.2],
        "N" => [0.2, 0.2, 1.0],
        "NA" => [0.4, 0.6, 1.0],
        "CL" => [0.0, 0.6, 0.0],
        _ => DEFAULT_COLOR,
    }
}

pub fn element_radius(element: &str) -> f32 {
    match element.trim().to_ascii_uppercase().as_str() {
        "H" => 0.6,
        "O" => 1.0,
        "C" => 0.9,
        "N" => 0.95,
        "NA" => 1.2,
        "CL" => 1.6,
        _ => DEFAULT_RADIUS,
    }
}

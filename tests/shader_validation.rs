//! The viewer's WGSL must parse and validate before it reaches a GPU.

use windtrail::viewer::OVERLAY_SHADER;

fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code).map_err(|e| format!("WGSL parse error: {:?}", e))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

#[test]
fn test_overlay_shader_validates() {
    validate_wgsl(OVERLAY_SHADER).expect("overlay shader should be valid");
}

#[test]
fn test_overlay_shader_entry_points() {
    let module = validate_wgsl(OVERLAY_SHADER).unwrap();
    let names: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"vs_main"));
    assert!(names.contains(&"fs_main"));
}

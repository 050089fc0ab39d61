use colorcloud_image::{Image, ImageSize};
use colorcloud_imgproc::calibration::{
    distortion::{distort_point_polynomial, PolynomialDistortion},
    new_camera_matrix::get_optimal_new_camera_matrix,
    CalibrationError, CameraIntrinsic,
};
use colorcloud_imgproc::undistort::UndistortionMap;

fn usb_cam() -> (CameraIntrinsic, PolynomialDistortion) {
    let intrinsic = CameraIntrinsic {
        fx: 754.53892599834842,
        fy: 754.53892599834842,
        cx: 319.5,
        cy: 239.5,
    };
    let distortion = PolynomialDistortion::from_coeffs(&[
        5.2038044809064208e-03,
        1.5288890999953295e-01,
        0.,
        0.,
        -1.7854072082302619e+00,
    ])
    .expect("five coefficients");
    (intrinsic, distortion)
}

const VGA: ImageSize = ImageSize {
    width: 640,
    height: 480,
};

#[test]
fn test_rectify_vga_keeps_size() -> Result<(), CalibrationError> {
    let (intrinsic, distortion) = usb_cam();
    let image = Image::<u8, 3>::from_size_val(VGA, 200)?;

    let map = UndistortionMap::new(intrinsic, distortion, 0.0);
    let rectified = map.rectify(&image)?;

    assert_eq!(rectified.size(), VGA);
    assert!(map.is_ready());

    // with alpha = 0 every rectified pixel samples inside the source, so a
    // flat image stays flat away from rounding at the very border
    let centre = rectified.pixel(320, 240).expect("inside");
    assert_eq!(centre, &[200, 200, 200]);

    Ok(())
}

#[test]
fn test_map_samples_inside_source_for_crop() -> Result<(), CalibrationError> {
    let (intrinsic, distortion) = usb_cam();
    let map = UndistortionMap::new(intrinsic, distortion, 0.0);
    let maps = map.get_or_init(VGA)?;

    let inside = maps
        .map_x
        .as_slice()
        .iter()
        .zip(maps.map_y.as_slice())
        .filter(|&(&x, &y)| x >= -0.5 && y >= -0.5 && x <= 639.5 && y <= 479.5)
        .count();

    // the inscribed rectangle is traced on a 9x9 grid, so only pixels on the
    // very border may fall slightly outside between two samples
    assert!(inside * 100 >= VGA.area() * 99);

    Ok(())
}

#[test]
fn test_centre_pixel_maps_near_principal_point() -> Result<(), CalibrationError> {
    let (intrinsic, distortion) = usb_cam();
    let new_intrinsic = get_optimal_new_camera_matrix(&intrinsic, &distortion, &VGA, 0.0)?;
    let map = UndistortionMap::new(intrinsic, distortion, 0.0);
    let maps = map.get_or_init(VGA)?;

    // the principal point of the rectified camera lands on the original one
    let u = new_intrinsic.cx.round() as usize;
    let v = new_intrinsic.cy.round() as usize;
    let x = *maps.map_x.get_pixel(u, v, 0)? as f64;
    let y = *maps.map_y.get_pixel(u, v, 0)? as f64;

    let (ex, ey) = {
        let nx = (u as f64 - new_intrinsic.cx) / new_intrinsic.fx;
        let ny = (v as f64 - new_intrinsic.cy) / new_intrinsic.fy;
        distort_point_polynomial(
            nx * intrinsic.fx + intrinsic.cx,
            ny * intrinsic.fy + intrinsic.cy,
            &intrinsic,
            &distortion,
        )
    };

    assert!((x - ex).abs() < 1e-3);
    assert!((y - ey).abs() < 1e-3);
    assert!((x - intrinsic.cx).abs() < 2.0);
    assert!((y - intrinsic.cy).abs() < 2.0);

    Ok(())
}

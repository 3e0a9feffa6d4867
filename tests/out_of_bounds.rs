use approx::assert_relative_eq;
use ndimg::img::{ArrayImg, CellImg};
use ndimg::outofbounds::{OutOfBounds, OutOfBoundsFactory, OutOfBoundsPolicy, extend, extend_value};
use ndimg::space::{FinalInterval, Localizable, Positionable, RealPositionable, Sampler};
use ndimg::transform::{Round, round_f64};
use ndimg::{ImgError, Result};
use test_case::test_case;

fn line() -> ArrayImg<u8> {
    ArrayImg::from_vec(&[5], vec![0, 1, 2, 3, 4]).unwrap()
}

fn read(factory: OutOfBoundsFactory, x: i64) -> u8 {
    let img = line();
    let mut ra = extend(&img, &factory).unwrap();
    ra.set_position(&[x]);
    *ra.get()
}

#[test_case(-1, 0)]
#[test_case(-2, 1)]
#[test_case(5, 4)]
#[test_case(6, 3)]
fn mirror_single(x: i64, expected: u8) {
    assert_eq!(read(OutOfBoundsFactory::MirrorSingle, x), expected);
}

#[test_case(-1, 1)]
#[test_case(5, 3)]
#[test_case(-4, 4)]
fn mirror_double(x: i64, expected: u8) {
    assert_eq!(read(OutOfBoundsFactory::MirrorDouble, x), expected);
}

#[test_case(-1, 4)]
#[test_case(5, 0)]
#[test_case(7, 2)]
fn periodic(x: i64, expected: u8) {
    assert_eq!(read(OutOfBoundsFactory::Periodic, x), expected);
}

#[test]
fn constant_sentinel_regardless_of_distance() -> Result<()> {
    let img = CellImg::<i32>::new(&[5, 5, 5], &[2, 3, 4])?;
    let mut ra = extend_value(&img, 128)?;
    for axis in 0..3 {
        for x in [-1000, -2, -1, 5, 6, 1000] {
            let mut p = [2, 2, 2];
            p[axis] = x;
            ra.set_position(&p);
            assert_eq!(*ra.get(), 128);
        }
    }

    let config = OutOfBoundsFactory::Value { value: 128.0 };
    let mut ra = extend(&img, &config)?;
    ra.set_position(&[-1, 7, 2]);
    assert_eq!(*ra.get(), 128);
    ra.set_position(&[0, 0, 0]);
    assert_eq!(*ra.get(), 0);
    Ok(())
}

#[test]
fn every_coordinate_is_readable() -> Result<()> {
    let data = (0..12).map(|v| v as f32).collect();
    let img = ArrayImg::from_vec(&[4, 3], data)?;
    let factories = [
        OutOfBoundsFactory::default(),
        OutOfBoundsFactory::MirrorSingle,
        OutOfBoundsFactory::MirrorDouble,
        OutOfBoundsFactory::Periodic,
        OutOfBoundsFactory::MirrorExpWindow { decay_rate: 0.3 },
    ];
    for factory in factories {
        let mut ra = extend(&img, &factory)?;
        for y in -7..10 {
            for x in -9..13 {
                ra.set_position(&[x, y]);
                let v = *ra.get();
                assert!((0.0..12.0).contains(&v));
                assert_eq!(ra.is_out_of_bounds(), !(0..4).contains(&x) || !(0..3).contains(&y));
            }
        }
    }
    Ok(())
}

#[test]
fn exp_window_decays_with_distance() -> Result<()> {
    let img = ArrayImg::from_vec(&[3, 3], vec![1.0f64; 9])?;
    let mut ra = extend(&img, &OutOfBoundsFactory::MirrorExpWindow { decay_rate: 1.0 })?;
    ra.set_position(&[-1, 1]);
    assert_relative_eq!(*ra.get(), (-1.0f64).exp());
    ra.set_position(&[-1, -1]);
    assert_relative_eq!(*ra.get(), (-2.0f64).exp());
    ra.set_position(&[1, 1]);
    assert_relative_eq!(*ra.get(), 1.0);
    Ok(())
}

#[test]
fn zero_extent_interval() -> Result<()> {
    let img = line();
    let empty = FinalInterval::new(vec![0], vec![-1])?;
    let result = OutOfBounds::new(img.random_access(), &empty, OutOfBoundsPolicy::Value(0));
    assert!(matches!(result, Err(ImgError::InvalidDimension(_))));
    Ok(())
}

#[test_case(-0.5, -1)]
#[test_case(0.5, 1)]
#[test_case(-0.49, 0)]
#[test_case(2.5, 3)]
fn rounding(r: f64, expected: i64) {
    assert_eq!(round_f64(r), expected);
}

#[test]
fn round_transform_over_extended_image() -> Result<()> {
    let img = line();
    let ra = extend(&img, &OutOfBoundsFactory::Periodic)?;
    let mut r = Round::new(ra);

    r.set_real_position(&[-0.5]);
    assert_eq!(r.long_position(0), -1);
    assert_eq!(*r.get(), 4);

    let mut seen = Vec::new();
    for _ in 0..6 {
        r.move_real_dim(0.75, 0);
        seen.push(*r.get());
    }
    // -0.5 + 0.75 k rounds to 0, 1, 2, 3, 3, 4
    assert_eq!(seen, vec![0, 1, 2, 3, 3, 4]);
    Ok(())
}

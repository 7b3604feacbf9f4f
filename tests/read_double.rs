use bpsel::prelude::*;
use ndarray::s;
use rand::{Rng, SeedableRng};

// "T": native shape (10, 20), user-visible shape (20, 10).
fn fixture() -> (Adios, Vec<f64>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xb9);
    let t: Vec<f64> = (0..200).map(|_| rng.gen()).collect();

    let mut f = MemFile::new();
    f.push_f64("T", &[10, 20], &t);

    let mut backend = MemBackend::new();
    backend.insert("sim.bp", f);

    (Adios::new(backend), t)
}

// Native element (i, j); its user-visible coordinates are (j, i).
fn native(t: &[f64], i: usize, j: usize) -> f64 {
    t[20 * i + j]
}

#[test]
fn metadata() {
    let (ad, _) = fixture();
    let file = ad.open("sim.bp").unwrap();
    let t = file.variable("T").unwrap();

    assert_eq!(t.name().unwrap(), "T");
    assert_eq!(t.shape().unwrap(), &[20, 10]);
    assert_eq!(t.dtype().unwrap(), Datatype::Double);
    println!("{:?}", t);
}

#[test]
fn full_read() {
    let (ad, tv) = fixture();
    let file = ad.open("sim.bp").unwrap();
    let t = file.variable("T").unwrap();

    let v = t.values::<f64, _>((.., ..)).unwrap();
    assert_eq!(v.shape(), &[20, 10]);

    for i in 0..10 {
        for j in 0..20 {
            assert_eq!(v[[j, i]], native(&tv, i, j));
        }
    }
}

#[test]
fn integer_expressions_squeeze() {
    let (ad, tv) = fixture();
    let file = ad.open("sim.bp").unwrap();
    let t = file.variable("T").unwrap();

    let v = t.values::<f64, _>((0, ..)).unwrap();
    assert_eq!(v.shape(), &[10]);
    for i in 0..10 {
        assert_eq!(v[[i]], native(&tv, i, 0));
    }

    let v = t.values::<f64, _>((.., 5)).unwrap();
    assert_eq!(v.shape(), &[20]);
    for j in 0..20 {
        assert_eq!(v[[j]], native(&tv, 5, j));
    }
}

#[test]
fn range_expressions() {
    let (ad, tv) = fixture();
    let file = ad.open("sim.bp").unwrap();
    let t = file.variable("T").unwrap();

    let v = t.values::<f64, _>((2..5, 1..4)).unwrap();
    assert_eq!(v.shape(), &[3, 3]);
    for a in 0..3 {
        for b in 0..3 {
            assert_eq!(v[[a, b]], native(&tv, 1 + b, 2 + a));
        }
    }

    let w = t.values::<f64, _>(s![2..5, 1..4]).unwrap();
    assert_eq!(v, w);
}

#[test]
fn negative_indices() {
    let (ad, tv) = fixture();
    let file = ad.open("sim.bp").unwrap();
    let t = file.variable("T").unwrap();

    let v = t.values::<f64, _>((-1, ..)).unwrap();
    assert_eq!(v.shape(), &[10]);
    for i in 0..10 {
        assert_eq!(v[[i]], native(&tv, i, 19));
    }

    let v = t.values::<f64, _>((-3.., 0)).unwrap();
    assert_eq!(v.shape(), &[3]);
    for (a, j) in (17..20).enumerate() {
        assert_eq!(v[[a]], native(&tv, 0, j));
    }
}

#[test]
fn slice_bounds_clamp() {
    let (ad, tv) = fixture();
    let file = ad.open("sim.bp").unwrap();
    let t = file.variable("T").unwrap();

    let v = t.values::<f64, _>((..100, 0)).unwrap();
    assert_eq!(v.shape(), &[20]);
    for j in 0..20 {
        assert_eq!(v[[j]], native(&tv, 0, j));
    }
}

#[test]
fn rejects_bad_selections() {
    let (ad, _) = fixture();
    let file = ad.open("sim.bp").unwrap();
    let t = file.variable("T").unwrap();

    // Non-unit step.
    assert!(t.values::<f64, _>(s![0..5;2, ..]).is_err());

    // Empty and reversed slices.
    assert!(t.values::<f64, _>((5..5, ..)).is_err());
    assert!(t.values::<f64, _>((5..2, ..)).is_err());

    // Rank mismatch, regardless of content.
    assert!(t.values::<f64, _>((0,)).is_err());
    assert!(t.values::<f64, _>((0, 0, 0)).is_err());

    // Element type must match the variable datatype.
    assert!(t.values::<f32, _>((.., ..)).is_err());
}

#[test]
fn missing_variable() {
    let (ad, _) = fixture();
    let file = ad.open("sim.bp").unwrap();

    assert!(file.variable("missing_var").is_err());
}

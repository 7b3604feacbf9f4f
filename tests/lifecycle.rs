use bpsel::prelude::*;

fn fixture() -> Adios {
    let mut f = MemFile::new();
    f.push_f64("x", &[4], &[1., 2., 3., 4.]);

    let mut backend = MemBackend::new();
    backend.insert("a.bp", f.clone());
    backend.insert("b.bp", f);

    Adios::new(backend)
}

#[test]
fn io_context_registry() {
    let ad = fixture();
    let mut file = ad.open("a.bp").unwrap();
    assert_eq!(ad.io_names(), vec!["io-a.bp".to_string()]);

    // A second handle to the same path collides on the io name while the
    // first is open; other paths are unaffected.
    assert!(ad.open("a.bp").is_err());
    let other = ad.open("b.bp").unwrap();
    drop(other);
    assert_eq!(ad.io_names(), vec!["io-a.bp".to_string()]);

    file.close().unwrap();
    assert!(ad.io_names().is_empty());

    // The second close is an error, but the path can be opened again.
    assert!(file.close().is_err());
    let _file = ad.open("a.bp").unwrap();
}

#[test]
fn drop_removes_io_context() {
    let ad = fixture();
    {
        let _file = ad.open("a.bp").unwrap();
        assert_eq!(ad.io_names(), vec!["io-a.bp".to_string()]);
    }
    assert!(ad.io_names().is_empty());
}

#[test]
fn failed_open_leaves_no_io_context() {
    let ad = fixture();

    assert!(ad.open("missing.bp").is_err());
    assert!(ad.io_names().is_empty());
}

#[test]
fn file_close_invalidates_variables() {
    let ad = fixture();
    let mut file = ad.open("a.bp").unwrap();
    let x = file.variable("x").unwrap();
    // Relookup vends an independent handle.
    let also_x = file.variable("x").unwrap();

    file.close().unwrap();

    for v in [&x, &also_x] {
        assert!(v.name().is_err());
        assert!(v.shape().is_err());
        assert!(v.dtype().is_err());
        assert!(v.values::<f64, _>((..,)).is_err());
    }

    assert!(file.variable("x").is_err());
    // The name snapshot survives the close.
    assert!(file.variables().contains("x"));
}

#[test]
fn variable_close_is_local() {
    let ad = fixture();
    let file = ad.open("a.bp").unwrap();
    let mut x = file.variable("x").unwrap();
    let y = file.variable("x").unwrap();

    x.close();
    assert!(x.name().is_err());
    assert!(x.shape().is_err());
    assert!(x.values::<f64, _>((..,)).is_err());

    // Closing twice stays closed, without any other effect.
    x.close();
    assert!(x.shape().is_err());

    // Other handles and the file itself are unaffected.
    let v = y.values::<f64, _>((..,)).unwrap();
    assert_eq!(v.shape(), &[4]);
    assert_eq!(v[[2]], 3.);
}

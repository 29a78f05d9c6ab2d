use briny_mlp::approx::approx_eq;
use briny_mlp::error::Error;
use briny_mlp::ops::cpu::{
    cat_last, exp, expand, log_softmax, relu, sigmoid, softmax, softplus, split_last, sum_to,
};
use briny_mlp::tensor;
use briny_mlp::tensors::{Tensor, broadcast_shape, broadcast_shapes, normalize_dim};
use rand::Rng;

fn random_tensor(shape: &[usize]) -> Tensor<f64> {
    let mut rng = rand::rng();
    let n = shape.iter().product();
    let data = (0..n).map(|_| rng.random_range(-3.0..3.0)).collect();
    Tensor::new(shape.to_vec(), data)
}

#[test]
fn test_tensor_creation() {
    let t = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(t.shape, vec![2, 2]);
    assert_eq!(t.data, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(t.ndim(), 2);
    assert_eq!(t.numel(), 4);
}

#[test]
fn test_tensor_shape_mismatch_panics() {
    let result = std::panic::catch_unwind(|| {
        Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0]);
    });
    assert!(result.is_err());
}

#[test]
fn test_try_new_reports_mismatch() {
    let err = Tensor::try_new(vec![2, 2], vec![1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(err, Error::shape_mismatch(&[2, 2], &[3]));
}

#[test]
fn test_tensor_macro() {
    let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(t.shape, vec![2, 2]);
    assert_eq!(t.data, vec![1.0, 2.0, 3.0, 4.0]);

    let s = tensor!(5.0);
    assert!(s.shape.is_empty());
    assert_eq!(s.last_dim(), None);
}

#[test]
fn test_leading_shape() {
    let t = Tensor::new(vec![4, 3, 2], vec![0.0; 24]);
    assert_eq!(t.leading_shape(), &[4, 3]);
    assert_eq!(t.last_dim(), Some(2));

    let v = tensor!([1.0, 2.0]);
    assert!(v.leading_shape().is_empty());
}

#[test]
fn test_normalize_dim() {
    assert_eq!(normalize_dim(1, 2), Ok(1));
    assert_eq!(normalize_dim(-1, 3), Ok(2));
    assert_eq!(
        normalize_dim(2, 2),
        Err(Error::InvalidDimension { dim: 2, ndim: 2 })
    );
    assert_eq!(
        normalize_dim(-3, 2),
        Err(Error::InvalidDimension { dim: -3, ndim: 2 })
    );
}

#[test]
fn test_broadcast_shape_rules() {
    assert_eq!(broadcast_shape(&[4, 1], &[1, 3]), Some(vec![4, 3]));
    assert_eq!(broadcast_shape(&[3], &[2, 3]), Some(vec![2, 3]));
    assert_eq!(broadcast_shape(&[], &[2, 3]), Some(vec![2, 3]));
    assert_eq!(broadcast_shape(&[1], &[1]), Some(vec![1]));
    assert_eq!(broadcast_shape(&[2, 3], &[3, 3]), None);
}

#[test]
fn test_broadcast_shapes_many() {
    let a: &[usize] = &[4, 1, 1];
    let b: &[usize] = &[1, 3, 1];
    let c: &[usize] = &[5];
    assert_eq!(broadcast_shapes([a, b, c]), Ok(vec![4, 3, 5]));

    let bad: &[usize] = &[2];
    assert!(matches!(
        broadcast_shapes([a, b, c, bad]),
        Err(Error::Broadcast { .. })
    ));
}

#[test]
fn test_exp_matches_elementwise() {
    let t = random_tensor(&[3, 4, 2]);
    let out = exp(&t);
    assert_eq!(out.shape, t.shape);
    for (y, x) in out.data.iter().zip(&t.data) {
        assert_eq!(*y, x.exp());
    }
}

#[test]
fn test_activations() {
    let t = tensor!([-1.0, 0.0, 2.0]);
    assert_eq!(relu(&t).data, vec![0.0, 0.0, 2.0]);
    assert_eq!(sigmoid(&t).data[1], 0.5);

    let sp = softplus(&tensor!([0.0, 800.0, -800.0]));
    assert!(approx_eq(&sp.data[0], &2.0f64.ln()));
    assert_eq!(sp.data[1], 800.0);
    assert!(sp.data[2] >= 0.0 && sp.data[2] < 1e-300);
}

#[test]
fn test_softmax_rows_sum_to_one() {
    let t = random_tensor(&[5, 4]);
    let out = softmax(&t, 1).unwrap();
    for row in out.data.chunks(4) {
        assert!(approx_eq(&row.iter().sum::<f64>(), &1.0));
    }
}

#[test]
fn test_softmax_axis_zero_normalizes_columns() {
    let t = tensor!([[1.0, 2.0], [1.0, 4.0]]);
    let out = softmax(&t, 0).unwrap();
    assert!(approx_eq(&out.data[0], &0.5));
    assert!(approx_eq(&out.data[2], &0.5));
    assert!(approx_eq(&(out.data[1] + out.data[3]), &1.0));
}

#[test]
fn test_softmax_middle_axis() {
    let t = random_tensor(&[2, 3, 4]);
    let out = softmax(&t, 1).unwrap();
    for b in 0..2 {
        for j in 0..4 {
            let sum: f64 = (0..3).map(|k| out.data[b * 12 + k * 4 + j]).sum();
            assert!(approx_eq(&sum, &1.0));
        }
    }
}

#[test]
fn test_log_softmax_is_log_of_softmax() {
    let t = random_tensor(&[3, 6]);
    let log = log_softmax(&t, -1).unwrap();
    let expected = softmax(&t, -1).unwrap();
    let exp_log = exp(&log);
    assert!(approx_eq(&exp_log, &expected));
}

#[test]
fn test_softmax_rejects_bad_axis() {
    let t = tensor!([1.0, 2.0]);
    assert_eq!(
        softmax(&t, 1),
        Err(Error::InvalidDimension { dim: 1, ndim: 1 })
    );
}

#[test]
fn test_expand_repeats_broadcast_dims() {
    let t = tensor!([[1.0, 2.0]]);
    let out = expand(&t, &[3, 1, 2]).unwrap();
    assert_eq!(out.shape, vec![3, 1, 2]);
    assert_eq!(out.data, vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);

    let col = tensor!([[1.0], [2.0]]);
    let out = expand(&col, &[2, 3]).unwrap();
    assert_eq!(out.data, vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
}

#[test]
fn test_expand_rejects_incompatible() {
    let t = tensor!([1.0, 2.0]);
    assert!(matches!(expand(&t, &[3]), Err(Error::Broadcast { .. })));
    assert!(matches!(expand(&t, &[]), Err(Error::Broadcast { .. })));
}

#[test]
fn test_sum_to_inverts_expand_counts() {
    let t = tensor!([[1.0, 2.0]]);
    let big = expand(&t, &[3, 2]).unwrap();
    let back = sum_to(&big, &[1, 2]).unwrap();
    assert_eq!(back.data, vec![3.0, 6.0]);

    let back = sum_to(&big, &[2]).unwrap();
    assert_eq!(back.shape, vec![2]);
    assert_eq!(back.data, vec![3.0, 6.0]);
}

#[test]
fn test_cat_last_interleaves_rows() {
    let a = Tensor::new(vec![4, 3, 2], (0..24).map(f64::from).collect());
    let b = Tensor::new(vec![4, 3, 5], (0..60).map(f64::from).collect());
    let c = cat_last(&[&a, &b]).unwrap();
    assert_eq!(c.shape, vec![4, 3, 7]);

    for row in 0..12 {
        assert_eq!(&c.data[row * 7..row * 7 + 2], &a.data[row * 2..row * 2 + 2]);
        assert_eq!(&c.data[row * 7 + 2..row * 7 + 7], &b.data[row * 5..row * 5 + 5]);
    }
}

#[test]
fn test_cat_last_errors() {
    let a = Tensor::new(vec![4, 3, 2], vec![0.0; 24]);
    let b = Tensor::new(vec![4, 2, 2], vec![0.0; 16]);
    assert_eq!(
        cat_last(&[&a, &b]),
        Err(Error::shape_mismatch(&[4, 3], &[4, 2]))
    );

    let s = tensor!(1.0);
    assert!(matches!(
        cat_last(&[&s, &s]),
        Err(Error::InvalidDimension { .. })
    ));
    assert_eq!(cat_last(&[]), Err(Error::EmptyInput { op: "cat" }));
}

#[test]
fn test_cat_last_zero_width() {
    let a = Tensor::new(vec![2, 0], vec![]);
    let c = cat_last(&[&a, &a]).unwrap();
    assert_eq!(c.shape, vec![2, 0]);
    assert!(c.data.is_empty());
}

#[test]
fn test_split_last_undoes_cat() {
    let a = random_tensor(&[2, 3]);
    let b = random_tensor(&[2, 1]);
    let c = cat_last(&[&a, &b]).unwrap();
    let parts = split_last(&c, &[3, 1]).unwrap();
    assert_eq!(parts, vec![a, b]);

    assert!(matches!(
        split_last(&c, &[1, 1]),
        Err(Error::ShapeMismatch { .. })
    ));
}

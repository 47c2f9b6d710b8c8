use matbridge::{
    ConversionError, ConversionMode, ConversionPath, DataType, Depth, HostArray, NativeMatrix,
    from_native_matrix,
    harness::{self, CaseInput},
    to_native_matrix,
};
use ndarray::{ArrayD, Axis, IxDyn, s};
use proptest::prelude::*;

const MODES: [ConversionMode; 2] = [ConversionMode::Copy, ConversionMode::ViewAlias];

fn standard_matrices() -> Vec<(String, HostArray)> {
    harness::standard_cases()
        .into_iter()
        .filter_map(|case| match case.input {
            CaseInput::Matrix(host) => Some((case.name.to_string(), host)),
            CaseInput::Vector { .. } => None,
        })
        .collect()
}

#[test]
fn standard_matrices_round_trip_in_both_modes() {
    for (name, host) in standard_matrices() {
        for mode in MODES {
            let mat = to_native_matrix(&host, mode).unwrap();
            assert_eq!(mat.depth().to_host(), host.data_type(), "{name}");
            assert_eq!(mat.dims(), host.ndim(), "{name}");

            let back = from_native_matrix(&mat).unwrap();
            assert_eq!(back, host, "{name} ({mode})");
            assert!(back.is_standard_layout(), "{name} ({mode})");
        }
    }
}

#[test]
fn alias_shares_memory_and_leaves_host_untouched() {
    for (name, host) in standard_matrices() {
        let before = host.clone();
        let alias = to_native_matrix(&host, ConversionMode::ViewAlias).unwrap();
        assert!(!alias.is_owner(), "{name}");
        assert_eq!(alias.as_ptr(), host.as_ptr(), "{name}");

        let copy = to_native_matrix(&host, ConversionMode::Copy).unwrap();
        assert!(copy.is_owner(), "{name}");
        assert!(copy.is_continuous(), "{name}");
        assert_ne!(copy.as_ptr(), host.as_ptr(), "{name}");

        drop(alias);
        assert_eq!(host, before, "{name}");
    }
}

#[test]
fn float_values_are_bit_exact() {
    let host = HostArray::from(
        ndarray::array![
            [[-1.2f64, 2.3, 3.4], [4.5, 5.6, -6.7], [7.8, -8.9, 9.8]],
            [[11.7, 12.6, -13.5], [14.4, -15.3, 16.2], [-17.1, 18.2, 19.3]]
        ]
        .into_dyn(),
    );
    for mode in MODES {
        let mat = to_native_matrix(&host, mode).unwrap();
        assert_eq!(mat.get::<f64>(1, 2, 0).map(f64::to_bits), Some((-17.1f64).to_bits()));

        let back = from_native_matrix(&mat).unwrap();
        let back = back.typed::<f64>().unwrap();
        assert_eq!(back[[1, 2, 0]].to_bits(), (-17.1f64).to_bits());
    }
}

#[test]
fn non_contiguous_sources_round_trip() {
    let base = ndarray::Array3::from_shape_fn((4, 6, 3), |(r, c, ch)| {
        (r * 100 + c * 10 + ch) as i16 - 250
    });

    let sliced = base.slice(s![1..4, ..;2, ..]).to_owned();
    let mut sources = vec![
        HostArray::from(base.clone().slice_move(s![1..4, ..;2, ..]).into_dyn()),
        HostArray::from(base.clone().permuted_axes([1, 0, 2]).into_dyn()),
        HostArray::from(base.index_axis(Axis(2), 1).to_owned().reversed_axes().into_dyn()),
    ];
    let mut reversed = base.clone();
    reversed.invert_axis(Axis(0));
    reversed.invert_axis(Axis(2));
    sources.push(HostArray::from(reversed.into_dyn()));

    assert_eq!(sources[0], HostArray::from(sliced.into_dyn()));

    for host in &sources {
        assert!(!host.is_standard_layout());
        for mode in MODES {
            let mat = to_native_matrix(host, mode).unwrap();
            assert_eq!(from_native_matrix(&mat).unwrap(), *host, "{mode}");
        }
    }
}

#[test]
fn rank_and_type_rejections() {
    let rank_4 = HostArray::from(ArrayD::<u8>::zeros(IxDyn(&[2, 2, 2, 2])));
    let rank_1 = HostArray::from(ArrayD::<f32>::zeros(IxDyn(&[5])));
    for (host, rank) in [(rank_4, 4), (rank_1, 1)] {
        for mode in MODES {
            assert_eq!(
                to_native_matrix(&host, mode).unwrap_err(),
                ConversionError::UnsupportedRank {
                    rank,
                    path: ConversionPath::Matrix,
                }
            );
        }
    }

    let wide = HostArray::from(ArrayD::<u8>::zeros(IxDyn(&[1, 1, 513])));
    assert_eq!(
        to_native_matrix(&wide, ConversionMode::Copy).unwrap_err(),
        ConversionError::TooManyChannels {
            channels: 513,
            max: 512,
        }
    );

    let int64 = HostArray::from(ArrayD::<i64>::zeros(IxDyn(&[2, 2])));
    assert_eq!(
        to_native_matrix(&int64, ConversionMode::ViewAlias).unwrap_err(),
        ConversionError::UnsupportedElementType {
            dtype: DataType::I64,
            path: ConversionPath::Matrix,
        }
    );
}

#[test]
fn format_strings_pick_the_native_depth() {
    let cases = [("b", Depth::S8), ("@H", Depth::U16), ("=i", Depth::S32), ("d", Depth::F64)];
    for (format, depth) in cases {
        assert_eq!(DataType::from_format(format).unwrap().to_native().unwrap(), depth);
    }
    assert!(DataType::from_format("?").unwrap().to_native().is_err());
}

#[test]
fn raw_buffers_round_trip() {
    let host = HostArray::from(
        ndarray::array![[[1u16, 2], [3, 4]], [[5, 6], [7, 65535]]].into_dyn(),
    );
    let alias = to_native_matrix(&host, ConversionMode::ViewAlias).unwrap();
    let bytes = alias.to_bytes();
    assert_eq!(bytes.len(), 8 * 2);

    let decoded = NativeMatrix::from_bytes(Depth::U16, alias.shape(), bytes).unwrap();
    assert!(decoded.is_owner());
    assert_eq!(decoded.dims(), 3);
    assert_eq!(from_native_matrix(&decoded).unwrap(), host);
}

#[test]
fn aliases_can_be_read_from_other_threads() {
    let grid = ndarray::Array2::from_shape_fn((16, 16), |(r, c)| (r * c) as i32);
    let host = HostArray::from(grid.into_dyn());
    let alias = to_native_matrix(&host, ConversionMode::ViewAlias).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| from_native_matrix(&alias).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), host);
        }
    });
}

fn matrix_shape() -> impl Strategy<Value = Vec<usize>> {
    prop_oneof![
        (1usize..6, 1usize..6).prop_map(|(rows, cols)| vec![rows, cols]),
        (1usize..6, 1usize..6, 1usize..5).prop_map(|(rows, cols, ch)| vec![rows, cols, ch]),
    ]
}

fn host_array<T, S>(element: S) -> impl Strategy<Value = ArrayD<T>>
where
    T: Clone + std::fmt::Debug,
    S: Strategy<Value = T> + Clone,
{
    matrix_shape().prop_flat_map(move |shape| {
        let len: usize = shape.iter().product();
        prop::collection::vec(element.clone(), len)
            .prop_map(move |data| ArrayD::from_shape_vec(IxDyn(&shape), data).unwrap())
    })
}

proptest! {
    #[test]
    fn f64_matrices_round_trip(array in host_array(-1.0e9f64..1.0e9), transpose in any::<bool>()) {
        let array = if transpose { array.reversed_axes() } else { array };
        let host = HostArray::from(array);
        for mode in MODES {
            let mat = to_native_matrix(&host, mode).unwrap();
            prop_assert_eq!(from_native_matrix(&mat).unwrap(), host.clone());
            prop_assert_eq!(from_native_matrix(&mat.deep_clone()).unwrap(), host.clone());
        }
    }

    #[test]
    fn i16_matrices_round_trip(array in host_array(any::<i16>()), transpose in any::<bool>()) {
        let array = if transpose { array.reversed_axes() } else { array };
        let host = HostArray::from(array);
        for mode in MODES {
            let mat = to_native_matrix(&host, mode).unwrap();
            let mut dst = NativeMatrix::default();
            mat.copy_to(&mut dst);
            prop_assert_eq!(from_native_matrix(&dst).unwrap(), host.clone());
        }
    }

    #[test]
    fn u8_matrices_survive_raw_buffers(array in host_array(any::<u8>())) {
        let host = HostArray::from(array);
        let mat = to_native_matrix(&host, ConversionMode::ViewAlias).unwrap();
        let decoded = NativeMatrix::from_bytes(Depth::U8, mat.shape(), mat.to_bytes()).unwrap();
        prop_assert_eq!(from_native_matrix(&decoded).unwrap(), host);
    }
}

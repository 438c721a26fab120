use wilds_formats::fbxskel::{name_hash, Bone, Fbxskel, FbxskelError, Quaternion, Vector3};

fn bone(name: &str, id: u16, parent_index: i16) -> Bone {
    Bone {
        name: name.to_string(),
        id,
        parent_index,
        rotation: Quaternion {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        },
        translation: Vector3 {
            x: 0.0,
            y: 0.1 * f32::from(id),
            z: 0.0,
        },
        scale: Vector3 {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        },
    }
}

fn chain() -> Fbxskel {
    Fbxskel {
        bones: vec![bone("root", 0, -1), bone("spine", 1, 0), bone("head", 2, 1)],
    }
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().expect("u16"))
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().expect("u32"))
}

fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(bytes[offset..offset + 8].try_into().expect("u64"))
}

#[test]
fn three_bone_chain_round_trips() {
    let skeleton = chain();
    let bytes = skeleton.to_vec().expect("encode");

    // 48-byte header, three 64-byte records, three index entries, names.
    assert_eq!(bytes.len(), 296);
    assert_eq!(u64_at(&bytes, 16), 48);
    assert_eq!(u64_at(&bytes, 24), 240);

    let decoded = Fbxskel::parse(&bytes).expect("decode");
    assert_eq!(decoded, skeleton);

    let names = decoded
        .bones
        .iter()
        .map(|bone| bone.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["root", "spine", "head"]);

    let parents = decoded
        .bones
        .iter()
        .map(|bone| bone.parent_index)
        .collect::<Vec<_>>();
    assert_eq!(parents, [-1, 0, 1]);
}

#[test]
fn empty_skeleton_round_trips() {
    let bytes = Fbxskel::default().to_vec().expect("encode");
    assert_eq!(bytes.len(), 48);

    let decoded = Fbxskel::parse(&bytes).expect("decode");
    assert!(decoded.bones.is_empty());
}

#[test]
fn floats_pass_through_as_raw_bits() {
    let mut skeleton = Fbxskel {
        bones: vec![bone("root", 0, -1)],
    };
    skeleton.bones[0].translation = Vector3 {
        x: f32::from_bits(0x0000_0001),
        y: -0.0,
        z: f32::MIN_POSITIVE,
    };
    skeleton.bones[0].rotation.w = f32::from_bits(0x3f80_0001);

    let decoded = Fbxskel::parse(&skeleton.to_vec().expect("encode")).expect("decode");
    let (before, after) = (&skeleton.bones[0], &decoded.bones[0]);
    assert_eq!(before.translation.x.to_bits(), after.translation.x.to_bits());
    assert_eq!(before.translation.y.to_bits(), after.translation.y.to_bits());
    assert_eq!(before.translation.z.to_bits(), after.translation.z.to_bits());
    assert_eq!(before.rotation.w.to_bits(), after.rotation.w.to_bits());
}

#[test]
fn rejects_wrong_magic() {
    let mut bytes = chain().to_vec().expect("encode");
    bytes[4..8].copy_from_slice(&0xdead_beefu32.to_le_bytes());

    match Fbxskel::parse(&bytes) {
        Err(FbxskelError::Format { version, magic }) => {
            assert_eq!(version, 7);
            assert_eq!(magic, 0xdead_beef);
        }
        other => panic!("expected a format mismatch, got {other:?}"),
    }
}

#[test]
fn rejects_unsupported_version() {
    let mut bytes = chain().to_vec().expect("encode");
    bytes[0..4].copy_from_slice(&8u32.to_le_bytes());

    assert!(matches!(
        Fbxskel::parse(&bytes),
        Err(FbxskelError::Format { version: 8, .. })
    ));
}

#[test]
fn truncated_input_is_fatal() {
    let bytes = chain().to_vec().expect("encode");

    // Inside the header, before the bone count.
    assert!(matches!(
        Fbxskel::parse(&bytes[..20]),
        Err(FbxskelError::Truncated)
    ));
    assert!(matches!(
        Fbxskel::parse(&bytes[..33]),
        Err(FbxskelError::Truncated)
    ));

    // Inside a bone record.
    assert!(matches!(
        Fbxskel::parse(&bytes[..58]),
        Err(FbxskelError::Truncated)
    ));
}

#[test]
fn hash_index_is_sorted_and_complete() {
    let skeleton = Fbxskel {
        bones: vec![
            bone("root", 0, -1),
            bone("spine", 1, 0),
            bone("head", 2, 1),
            bone("L_arm", 3, 1),
            bone("R_arm", 4, 1),
            bone("tail", 5, 0),
        ],
    };
    let bytes = skeleton.to_vec().expect("encode");

    let index_offset = u64_at(&bytes, 24) as usize;
    let entries = (0..skeleton.bones.len())
        .map(|i| {
            let at = index_offset + i * 8;
            (u32_at(&bytes, at), u32_at(&bytes, at + 4))
        })
        .collect::<Vec<_>>();

    for pair in entries.windows(2) {
        assert!(pair[0].0 <= pair[1].0, "index not sorted: {entries:?}");
    }

    // A linear scan over the index finds every bone by name hash.
    for (expected, bone) in skeleton.bones.iter().enumerate() {
        let hash = name_hash(&bone.name);
        let found = entries
            .iter()
            .find(|&&(entry_hash, _)| entry_hash == hash)
            .map(|&(_, bone_index)| bone_index as usize);
        assert_eq!(found, Some(expected), "bone {:?}", bone.name);
    }
}

#[test]
fn count_is_written_wide_but_read_narrow() {
    let bytes = chain().to_vec().expect("encode");

    // The writer emits the count as a u64 while readers take a u16; the
    // upper six bytes must stay zero for the file to stay loadable.
    assert_eq!(u16_at(&bytes, 32), 3);
    assert_eq!(&bytes[34..40], &[0u8; 6]);
    assert_eq!(Fbxskel::parse(&bytes).expect("decode").bones.len(), 3);
}

#[test]
fn root_bone_decodes_to_no_parent() {
    let decoded = Fbxskel::parse(&chain().to_vec().expect("encode")).expect("decode");
    assert_eq!(decoded.bones[0].parent(), None);
    assert_eq!(decoded.bones[1].parent(), Some(0));
    assert_eq!(decoded.bones[2].parent(), Some(1));
}

#[test]
fn dangling_parent_is_rejected_on_write() {
    let skeleton = Fbxskel {
        bones: vec![bone("root", 0, -1), bone("spine", 1, 5)],
    };

    assert!(matches!(
        skeleton.to_vec(),
        Err(FbxskelError::ParentOutOfBounds { bone: 1, parent: 5 })
    ));
}

#[test]
fn dangling_parent_is_rejected_on_parse() {
    let mut bytes = chain().to_vec().expect("encode");

    let table = u64_at(&bytes, 16) as usize;
    let parent_field = table + 2 * 64 + 12;
    bytes[parent_field..parent_field + 2].copy_from_slice(&9i16.to_le_bytes());

    assert!(matches!(
        Fbxskel::parse(&bytes),
        Err(FbxskelError::ParentOutOfBounds { bone: 2, parent: 9 })
    ));
}

#[test]
fn name_hashes_match_the_game() {
    assert_eq!(name_hash("root"), 0xaba7_de3c);
    assert_eq!(name_hash("spine"), 0xaaa0_4fe3);
    assert_eq!(name_hash("head"), 0x2bf8_82e3);
    assert_eq!(name_hash("L_UpperArm"), 0x502c_ecaa);
}

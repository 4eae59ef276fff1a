//! 测试顺序读取：有限文件从头读到末尾

use pcaplive_io::{PcapFileHeader, PcapLiveReader};

mod common;
use common::{
    append_packet, create_capture_file, make_packet,
};

#[test]
fn test_read_all_packets_in_order() {
    let dir =
        tempfile::tempdir().expect("创建临时目录失败");
    let path = create_capture_file(&dir, "seq.pcap")
        .expect("创建捕获文件失败");

    let mut written = Vec::new();
    for i in 0..20u32 {
        let packet =
            make_packet(i, 64 + (i as usize) * 7);
        append_packet(&path, &packet)
            .expect("追加数据包失败");
        written.push(packet);
    }

    let mut reader = PcapLiveReader::new(&path)
        .expect("创建Reader失败");

    let mut read = Vec::new();
    while let Some(packet) =
        reader.read_packet().expect("读取失败")
    {
        read.push(packet);
    }

    assert_eq!(read.len(), written.len());
    for (got, expected) in read.iter().zip(&written) {
        assert_eq!(got.header, expected.header);
        assert_eq!(got.data, expected.data);
    }

    // 到达末尾后重复读取仍然返回末尾
    assert!(reader
        .read_packet()
        .expect("末尾读取失败")
        .is_none());
    assert!(reader.is_eof());
    reader.close();
}

#[test]
fn test_zero_copy_payload_matches() {
    let dir =
        tempfile::tempdir().expect("创建临时目录失败");
    let path = create_capture_file(&dir, "zc.pcap")
        .expect("创建捕获文件失败");

    let packet = make_packet(7, 300);
    append_packet(&path, &packet)
        .expect("追加数据包失败");

    let mut reader = PcapLiveReader::new(&path)
        .expect("创建Reader失败");

    let view = reader
        .next_packet()
        .expect("读取失败")
        .expect("未读取到数据包");
    assert_eq!(view.captured_length(), 300);
    assert_eq!(view.data, &packet.data[..]);
    assert_eq!(
        view.timestamp_ns(),
        packet.get_timestamp_ns()
    );
}

#[test]
fn test_packets_iterator_ends_at_eof() {
    let dir =
        tempfile::tempdir().expect("创建临时目录失败");
    let path = create_capture_file(&dir, "iter.pcap")
        .expect("创建捕获文件失败");

    for i in 0..10u32 {
        append_packet(&path, &make_packet(i, 100))
            .expect("追加数据包失败");
    }

    let mut reader = PcapLiveReader::new(&path)
        .expect("创建Reader失败");

    let packets: Vec<_> = reader
        .packets()
        .collect::<Result<_, _>>()
        .expect("迭代读取失败");
    assert_eq!(packets.len(), 10);

    // 迭代器结束后再次获取：仍在末尾，立即结束
    assert_eq!(reader.packets().count(), 0);
}

#[test]
fn test_read_packets_batch() {
    let dir =
        tempfile::tempdir().expect("创建临时目录失败");
    let path = create_capture_file(&dir, "batch.pcap")
        .expect("创建捕获文件失败");

    for i in 0..5u32 {
        append_packet(&path, &make_packet(i, 50))
            .expect("追加数据包失败");
    }

    let mut reader = PcapLiveReader::new(&path)
        .expect("创建Reader失败");

    let first = reader.read_packets(3).expect("批量读取失败");
    assert_eq!(first.len(), 3);

    // 请求数量超过剩余时只返回剩余部分
    let rest =
        reader.read_packets(10).expect("批量读取失败");
    assert_eq!(rest.len(), 2);
}

#[test]
fn test_current_offset_tracks_records() {
    let dir =
        tempfile::tempdir().expect("创建临时目录失败");
    let path = create_capture_file(&dir, "offset.pcap")
        .expect("创建捕获文件失败");

    append_packet(&path, &make_packet(0, 40))
        .expect("追加数据包失败");

    let mut reader = PcapLiveReader::new(&path)
        .expect("创建Reader失败");
    assert_eq!(
        reader.current_offset(),
        PcapFileHeader::HEADER_SIZE as u64
    );

    reader.read_packet().expect("读取失败");
    assert_eq!(
        reader.current_offset(),
        (PcapFileHeader::HEADER_SIZE + 16 + 40) as u64
    );
}

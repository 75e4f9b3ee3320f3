use crate::error::Error;
use crate::parsing::segment::parse_segment_str;

fn segment_json() -> String {
    r#"{
        "exposure": {
            "nints": 3,
            "ngroups": 4,
            "nframes": 2,
            "groupgap": 0,
            "nresets": 1,
            "tframe": 10.73677,
            "bartdelt": 120.0
        },
        "segment": {
            "exsegnum": 1,
            "exsegtot": 2,
            "intstart": 1,
            "intend": 2
        },
        "groups": [
            {
                "integration_number": 1,
                "group_number": 1,
                "group_end_time": "2022-07-24T13:17:42.473"
            },
            {
                "integration_number": 1,
                "group_number": 4,
                "group_end_time": "2022-07-24T13:18:46.894"
            }
        ]
    }"#
    .to_string()
}

#[test]
fn parses_config_segment_and_packets() {
    let segment = parse_segment_str(&segment_json()).unwrap();

    assert_eq!(segment.config.n_integrations, 3);
    assert_eq!(segment.config.n_groups, 4);
    assert_eq!(segment.config.frame_time, 10.73677);

    let info = segment.segment.unwrap();
    assert_eq!(info.number, 1);
    assert_eq!(info.total, 2);
    assert_eq!(info.int_start, 1);
    assert_eq!(info.int_end, 2);

    assert_eq!(segment.packets.len(), 2);
    assert_eq!(segment.packets[0].integration, 1);
    assert_eq!(segment.packets[1].group, 4);
    assert!(segment.packets[0].end_time < segment.packets[1].end_time);
}

#[test]
fn segment_block_is_optional() {
    let json = segment_json().replace(
        r#""segment": {
            "exsegnum": 1,
            "exsegtot": 2,
            "intstart": 1,
            "intend": 2
        },"#,
        "",
    );
    let segment = parse_segment_str(&json).unwrap();
    assert!(segment.segment.is_none());
}

#[test]
fn fewer_than_two_packets_is_fatal() {
    let json = segment_json().replace(
        r#",
            {
                "integration_number": 1,
                "group_number": 4,
                "group_end_time": "2022-07-24T13:18:46.894"
            }"#,
        "",
    );
    assert!(matches!(
        parse_segment_str(&json),
        Err(Error::InsufficientData(_))
    ));
}

#[test]
fn unparseable_group_time_is_fatal() {
    let json = segment_json().replace("2022-07-24T13:18:46.894", "yesterday-ish");
    assert!(matches!(parse_segment_str(&json), Err(Error::TimeParse(_))));
}

#[test]
fn invalid_config_is_fatal() {
    let json = segment_json().replace(r#""ngroups": 4"#, r#""ngroups": 0"#);
    assert!(matches!(
        parse_segment_str(&json),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn missing_field_is_a_json_error() {
    let json = segment_json().replace(r#""tframe": 10.73677,"#, "");
    assert!(matches!(parse_segment_str(&json), Err(Error::Json(_))));
}

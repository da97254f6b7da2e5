use super::*;
use shared::domain::SurveyType;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn lookup(effect: Option<FormEffect>) -> LookupRequest {
    match effect {
        Some(FormEffect::Lookup(request)) => request,
        other => panic!("expected lookup effect, got {other:?}"),
    }
}

fn opened_screen() -> FormScreen {
    let mut screen = FormScreen::new();
    let request = lookup(screen.handle(FormEvent::Opened).expect("open"));
    assert!(matches!(request, LookupRequest::Divisions { .. }));
    screen
        .handle(FormEvent::LookupCompleted {
            request,
            result: Ok(strings(&["Dhaka", "Khulna"])),
        })
        .expect("divisions");
    screen
}

#[test]
fn opening_loads_divisions() {
    let screen = opened_screen();
    let view = screen.view();

    assert_eq!(view.divisions, strings(&["Dhaka", "Khulna"]));
    assert_eq!(view.pending_lookups, 0);
    assert!(view.is_settled());
}

#[test]
fn division_selection_tracks_pending_lookup() {
    let mut screen = opened_screen();

    let request = lookup(
        screen
            .handle(FormEvent::DivisionSelected("Dhaka".into()))
            .expect("select"),
    );
    assert_eq!(screen.view().pending_lookups, 1);
    assert!(!screen.view().is_settled());

    screen
        .handle(FormEvent::LookupCompleted {
            request,
            result: Ok(strings(&["Gazipur", "Tangail"])),
        })
        .expect("districts");
    let view = screen.view();
    assert_eq!(view.pending_lookups, 0);
    assert_eq!(view.districts, strings(&["Gazipur", "Tangail"]));
}

#[test]
fn late_dhaka_response_is_dropped_after_switching_to_khulna() {
    let mut screen = opened_screen();
    let dhaka = lookup(
        screen
            .handle(FormEvent::DivisionSelected("Dhaka".into()))
            .expect("dhaka"),
    );
    let khulna = lookup(
        screen
            .handle(FormEvent::DivisionSelected("Khulna".into()))
            .expect("khulna"),
    );

    screen
        .handle(FormEvent::LookupCompleted {
            request: dhaka,
            result: Ok(strings(&["Gazipur", "Tangail"])),
        })
        .expect("late dhaka");
    assert!(screen.view().districts.is_empty());
    assert_eq!(screen.view().pending_lookups, 1);

    screen
        .handle(FormEvent::LookupCompleted {
            request: khulna,
            result: Ok(strings(&["Jessore"])),
        })
        .expect("khulna");
    assert_eq!(screen.view().districts, strings(&["Jessore"]));
    assert_eq!(screen.view().selection.division, "khulna");
}

#[test]
fn lookup_failure_is_a_notice_not_an_error() {
    let mut screen = opened_screen();
    let request = lookup(
        screen
            .handle(FormEvent::DivisionSelected("Dhaka".into()))
            .expect("select"),
    );

    let effect = screen
        .handle(FormEvent::LookupCompleted {
            request,
            result: Err(DirectoryError::Transport("connection reset".into())),
        })
        .expect("failure is absorbed");

    assert_eq!(effect, None);
    let view = screen.view();
    assert!(view.districts.is_empty());
    let notice = view.notice.expect("notice");
    assert_eq!(notice.kind, NoticeKind::NetworkFailure);
    assert!(notice.message.contains("district"));
}

#[test]
fn rejected_input_is_recorded_until_next_user_event() {
    let mut screen = opened_screen();
    screen.handle(FormEvent::MouzaAdded).expect("add");

    let err = screen
        .handle(FormEvent::edit(0, "surveyType", "Not A Real Type").expect("field"))
        .expect_err("invalid");
    assert!(matches!(err, FormError::InvalidSurveyType { .. }));
    assert_eq!(screen.view().rejection, Some(err));
    assert_eq!(screen.view().mouzas[0].survey_type, None);

    screen
        .handle(FormEvent::UnionChanged("Barmi".into()))
        .expect("union");
    assert_eq!(screen.view().rejection, None);
}

#[test]
fn removing_from_empty_list_is_rejected() {
    let mut screen = FormScreen::new();

    let err = screen
        .handle(FormEvent::MouzaRemoved(0))
        .expect_err("empty");

    assert_eq!(err, FormError::IndexOutOfRange { position: 0, len: 0 });
    assert!(screen.view().mouzas.is_empty());
}

#[test]
fn submit_builds_payload_from_current_state() {
    let mut screen = opened_screen();
    let request = lookup(
        screen
            .handle(FormEvent::DivisionSelected("Dhaka".into()))
            .expect("division"),
    );
    screen
        .handle(FormEvent::LookupCompleted {
            request,
            result: Ok(strings(&["Gazipur"])),
        })
        .expect("districts");
    let request = lookup(
        screen
            .handle(FormEvent::DistrictSelected("Gazipur".into()))
            .expect("district"),
    );
    screen
        .handle(FormEvent::LookupCompleted {
            request,
            result: Ok(strings(&["Kaliakair"])),
        })
        .expect("upazilas");
    screen
        .handle(FormEvent::UpazilaSelected("Kaliakair".into()))
        .expect("upazila");
    screen
        .handle(FormEvent::UnionChanged("Mouchak".into()))
        .expect("union");
    for name in ["first", "second"] {
        screen.handle(FormEvent::MouzaAdded).expect("add");
        let position = screen.mouzas().len() - 1;
        screen
            .handle(FormEvent::edit(position, "mouzaName", name).expect("field"))
            .expect("name");
    }
    screen
        .handle(FormEvent::edit(1, "surveyType", "Census Survey").expect("field"))
        .expect("type");
    screen.handle(FormEvent::MouzaRemoved(0)).expect("remove");

    let effect = screen.handle(FormEvent::SubmitRequested).expect("submit");

    let Some(FormEffect::Submit(payload)) = effect else {
        panic!("expected submit effect");
    };
    assert_eq!(payload.division, "dhaka");
    assert_eq!(payload.district, "gazipur");
    assert_eq!(payload.upazila, "kaliakair");
    assert_eq!(payload.union, "Mouchak");
    assert_eq!(payload.mouza_data.len(), 1);
    assert_eq!(payload.mouza_data[0].mouza_name, "second");
    assert_eq!(payload.mouza_data[0].survey_type, Some(SurveyType::Census));
    assert_eq!(screen.submission(), &SubmissionStatus::Pending);
}

#[test]
fn second_submit_while_pending_is_ignored() {
    let mut screen = opened_screen();

    let first = screen.handle(FormEvent::SubmitRequested).expect("first");
    let second = screen.handle(FormEvent::SubmitRequested).expect("second");

    assert!(matches!(first, Some(FormEffect::Submit(_))));
    assert_eq!(second, None);
    assert!(!screen.view().is_settled());
}

#[test]
fn server_rejection_surfaces_message_verbatim() {
    let mut screen = opened_screen();
    screen.handle(FormEvent::SubmitRequested).expect("submit");

    screen
        .handle(FormEvent::SubmissionCompleted(Err(
            SubmitError::ServerRejection {
                status: 500,
                message: "DB error".into(),
            },
        )))
        .expect("completed");

    let view = screen.view();
    assert_eq!(
        view.submission,
        SubmissionStatus::Rejected {
            status: 500,
            message: "DB error".into()
        }
    );
    assert_eq!(
        view.notice.expect("notice").message,
        "Error submitting form: DB error"
    );
}

#[test]
fn transport_failure_reverts_to_not_submitted() {
    let mut screen = opened_screen();
    screen.handle(FormEvent::SubmitRequested).expect("submit");

    screen
        .handle(FormEvent::SubmissionCompleted(Err(
            SubmitError::NetworkFailure("connection refused".into()),
        )))
        .expect("completed");

    let view = screen.view();
    assert_eq!(view.submission, SubmissionStatus::Idle);
    assert_eq!(
        view.notice,
        Some(Notice::new(
            NoticeKind::NetworkFailure,
            SUBMIT_TRANSPORT_FAILURE_MESSAGE
        ))
    );
    assert!(matches!(
        screen.handle(FormEvent::SubmitRequested).expect("retry"),
        Some(FormEffect::Submit(_))
    ));
}

#[test]
fn success_allows_resubmission() {
    let mut screen = opened_screen();
    screen.handle(FormEvent::SubmitRequested).expect("submit");
    screen
        .handle(FormEvent::SubmissionCompleted(Ok(SubmissionReceipt {
            status: 200,
            message: None,
        })))
        .expect("completed");

    assert_eq!(
        screen.submission(),
        &SubmissionStatus::Succeeded {
            message: SUBMIT_SUCCESS_MESSAGE.into()
        }
    );
    assert!(matches!(
        screen.handle(FormEvent::SubmitRequested).expect("again"),
        Some(FormEffect::Submit(_))
    ));
}

#[test]
fn revision_advances_for_every_event() {
    let mut screen = FormScreen::new();
    let start = screen.view().revision;

    screen.handle(FormEvent::MouzaAdded).expect("add");
    let _ = screen.handle(FormEvent::MouzaRemoved(5));

    assert_eq!(screen.view().revision, start + 2);
}

#[test]
fn abandoned_lookup_no_longer_counts_as_pending() {
    let mut screen = opened_screen();
    let effect = screen
        .handle(FormEvent::DivisionSelected("Dhaka".into()))
        .expect("select")
        .expect("lookup effect");
    assert_eq!(screen.view().pending_lookups, 1);

    screen.abandon(&effect);

    assert_eq!(screen.view().pending_lookups, 0);
    assert!(screen.view().is_settled());
}

#[test]
fn abandoned_submit_returns_to_idle() {
    let mut screen = opened_screen();
    let effect = screen
        .handle(FormEvent::SubmitRequested)
        .expect("submit")
        .expect("submit effect");
    assert_eq!(screen.view().submission, SubmissionStatus::Pending);

    screen.abandon(&effect);

    assert_eq!(screen.view().submission, SubmissionStatus::Idle);
    assert!(screen.view().is_settled());
    assert!(matches!(
        screen.handle(FormEvent::SubmitRequested).expect("retry"),
        Some(FormEffect::Submit(_))
    ));
}

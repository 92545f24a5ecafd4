//! Java source tree shared by the integration tests.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const REPOSITORY: &str = "com.acme.ehr.dao.DischargeDetailRepository";

fn write(root: &Path, rel: &str, src: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, src).unwrap();
}

pub fn source_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "com/acme/ehr/entity/DischargeDetail.java",
        r#"package com.acme.ehr.entity;

import javax.persistence.*;
import java.util.List;

@Entity
@Table(name = "discharge_detail")
public class DischargeDetail extends BaseEntity {
    @Id
    @GeneratedValue(strategy = GenerationType.IDENTITY)
    private Long id;

    private Long hospitalId;
    private Long patientId;
    private Boolean isActive;

    @ManyToOne(fetch = FetchType.LAZY)
    @JoinColumn(name = "nurse_request_id", referencedColumnName = "id")
    private DischargeNurseRequest dischargeNurseRequest;

    @OneToMany(mappedBy = "dischargeDetail")
    private List<DischargeNote> notes;
}
"#,
    );

    write(
        root,
        "com/acme/ehr/entity/DischargeNurseRequest.java",
        r#"package com.acme.ehr.entity;

@Entity
@Table(name = "\"DischargeNurseRequest\"")
public class DischargeNurseRequest {
    @Id
    private Long id;
    private String requestStatus;
}
"#,
    );

    write(
        root,
        "com/acme/ehr/entity/DischargeNote.java",
        r#"package com.acme.ehr.entity;

@Entity
@Table(name = "discharge_note")
public class DischargeNote {
    @Id
    private Long noteId;

    @ManyToOne
    @JoinColumn(name = "detail_id")
    private DischargeDetail dischargeDetail;
}
"#,
    );

    write(
        root,
        "com/acme/ehr/dao/DischargeDetailRepository.java",
        r#"package com.acme.ehr.dao;

import com.acme.ehr.entity.DischargeDetail;
import org.springframework.data.jpa.repository.JpaRepository;
import org.springframework.data.jpa.repository.Query;
import org.springframework.data.repository.query.Param;
import java.util.List;

public interface DischargeDetailRepository extends JpaRepository<DischargeDetail, Long> {

    @Query("select d from DischargeDetail d where d.hospitalId = ?1 and d.patientId = ?2")
    List<DischargeDetail> findByPatient(Long hospitalId, Long patientId);

    List<DischargeDetail> findByPatientId(Long patientId);

    @Query("select d from DischargeDetail d join d.dischargeNurseRequest n "
            + "where n.requestStatus = :status")
    List<DischargeDetail> findByRequestStatus(@Param("status") String status);

    @Query(value = "select * from discharge_detail where hospital_id = :hid limit 5",
           nativeQuery = true)
    List<DischargeDetail> nativeSample(@Param("hid") Long hospitalId);

    @Query("select d from DischargeDetail d where d.")
    List<DischargeDetail> broken();

    @Query("select d from DischargeDetail d join d.notes x where d.isActive = true")
    List<DischargeDetail> withNotes();
}
"#,
    );

    write(
        root,
        "com/acme/ehr/dao/OrphanRepository.java",
        r#"package com.acme.ehr.dao;

import com.acme.ehr.entity.Missing;

public interface OrphanRepository extends JpaRepository<Missing, Long> {
    @Query("select m from Missing m")
    List<Missing> all();
}
"#,
    );

    dir
}
